//! Demo targets wired into the `command-console` binary.

use anyhow::Context;
use command_console::{
    Args, CommandTable, EnumType, Interpreter, Object, ParamType, Target, Value,
};
use regex::Regex;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

pub const HEADING: EnumType = EnumType::new("Heading", &["North", "East", "South", "West"]);

/// Register a fresh [`Ship`] and [`Calculator`], returning the number of
/// operations added. A rejected target is logged and skipped.
pub fn install(console: &mut Interpreter) -> usize {
    let results = [
        console.register(Rc::new(RefCell::new(Ship::default()))),
        console.register(Rc::new(RefCell::new(Calculator::default()))),
    ];
    results
        .into_iter()
        .map(|result| {
            result.unwrap_or_else(|err| {
                tracing::warn!(error = %err, "target not registered");
                0
            })
        })
        .sum()
}

/// A ship whose controls are exposed as console commands.
pub struct Ship {
    name: String,
    speed: f32,
    heading: &'static str,
    shields: bool,
}

impl Default for Ship {
    fn default() -> Self {
        Self {
            name: "Nautilus".to_string(),
            speed: 0.0,
            heading: "North",
            shields: false,
        }
    }
}

impl Ship {
    fn snapshot(&self) -> ShipStatus {
        ShipStatus {
            name: self.name.clone(),
            speed: self.speed,
            heading: self.heading,
            shields: self.shields,
        }
    }
}

impl Target for Ship {
    fn declare(table: &mut CommandTable<Self>) {
        table
            .command("SetSpeed", |ship: &mut Ship, args: &Args| {
                ship.speed = args.float(0)?;
                Ok(None)
            })
            .param("value", ParamType::Float);
        table.command("GetSpeed", |ship: &mut Ship, _: &Args| Ok(Some(ship.speed.into())));
        table
            .command("Turn", |ship: &mut Ship, args: &Args| {
                ship.heading = args.member(0)?;
                Ok(None)
            })
            .param("heading", ParamType::Enum(HEADING));
        table.command("Heading", |ship: &mut Ship, _: &Args| {
            Ok(Some(Value::Enum {
                type_name: HEADING.name,
                member: ship.heading,
            }))
        });
        table
            .command("Rename", |ship: &mut Ship, args: &Args| {
                ship.name = args.str(0)?.to_string();
                Ok(None)
            })
            .param("name", ParamType::Str);
        table
            .command("Shields", |ship: &mut Ship, args: &Args| {
                ship.shields = args.bool(0)?;
                Ok(None)
            })
            .param("on", ParamType::Bool);
        table
            .command("Warp", |ship: &mut Ship, args: &Args| {
                let factor = args.double(0)?;
                let jumps = args.int(1)?;
                let distance = factor * f64::from(ship.speed) * f64::from(jumps);
                Ok(Some(format!("{} travelled {distance} leagues", ship.name).into()))
            })
            .param("factor", ParamType::Double)
            .param("jumps", ParamType::Int);
        table.command("Status", |ship: &mut Ship, _: &Args| {
            Ok(Some(Value::object(ship.snapshot())))
        });
        table
            .command("Restore", |ship: &mut Ship, args: &Args| {
                let status = args.object::<ShipStatus>(0)?;
                ship.name = status.name.clone();
                ship.speed = status.speed;
                ship.heading = status.heading;
                ship.shields = status.shields;
                Ok(None)
            })
            .param("status", ParamType::Object("ShipStatus"));
    }
}

/// Snapshot of a [`Ship`], returned by `Status` and accepted by `Restore`.
pub struct ShipStatus {
    name: String,
    speed: f32,
    heading: &'static str,
    shields: bool,
}

impl fmt::Display for ShipStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} knots heading {}, shields {}",
            self.name,
            self.speed,
            self.heading,
            if self.shields { "up" } else { "down" }
        )
    }
}

impl Object for ShipStatus {
    fn type_name(&self) -> &'static str {
        "ShipStatus"
    }
}

/// Arithmetic and text helpers.
#[derive(Default)]
pub struct Calculator {
    evaluations: i32,
}

impl Target for Calculator {
    fn declare(table: &mut CommandTable<Self>) {
        table
            .command("Add", |calc: &mut Calculator, args: &Args| {
                calc.evaluations += 1;
                let sum = args
                    .int(0)?
                    .checked_add(args.int(1)?)
                    .context("integer overflow")?;
                Ok(Some(sum.into()))
            })
            .param("a", ParamType::Int)
            .param("b", ParamType::Int);
        table
            .command("Mul", |calc: &mut Calculator, args: &Args| {
                calc.evaluations += 1;
                Ok(Some((args.double(0)? * args.double(1)?).into()))
            })
            .param("a", ParamType::Double)
            .param("b", ParamType::Double);
        table
            .command("Concat", |calc: &mut Calculator, args: &Args| {
                calc.evaluations += 1;
                Ok(Some(format!("{}{}", args.str(0)?, args.str(1)?).into()))
            })
            .param("a", ParamType::Str)
            .param("b", ParamType::Str);
        table
            .command("Matches", |calc: &mut Calculator, args: &Args| {
                calc.evaluations += 1;
                let pattern = args.str(0)?;
                let regex = Regex::new(pattern)
                    .with_context(|| format!("invalid pattern '{pattern}'"))?;
                Ok(Some(regex.is_match(args.str(1)?).into()))
            })
            .param("pattern", ParamType::Str)
            .param("text", ParamType::Str);
        table
            .command("Echo", |_: &mut Calculator, args: &Args| Ok(Some(args.value(0)?.clone())))
            .param("value", ParamType::Any);
        table.command("Count", |calc: &mut Calculator, _: &Args| {
            Ok(Some(calc.evaluations.into()))
        });
        table.method("Reset", |calc: &mut Calculator, _: &Args| {
            calc.evaluations = 0;
            Ok(None)
        });
    }
}
