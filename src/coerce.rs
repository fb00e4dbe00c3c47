use crate::command::Param;
use crate::error::{ConsoleError, Result};
use crate::value::{ParamType, Value};
use std::str::FromStr;

/// Pair each resolved argument with its declared parameter and convert
/// string arguments to the declared type.
///
/// Stops at the first argument that cannot be converted; nothing is
/// returned for a partially coerced list. `args` and `params` must be of
/// equal length, which the caller checks beforehand.
pub(crate) fn try_coerce(args: Vec<Option<Value>>, params: &[Param]) -> Result<Vec<Value>> {
    args.into_iter()
        .zip(params)
        .enumerate()
        .map(|(index, (arg, param))| {
            let value = arg.ok_or_else(|| ConsoleError::NullArgument {
                index,
                expected: param.ty.to_string(),
            })?;
            coerce(value, &param.ty)
        })
        .collect()
}

fn coerce(value: Value, ty: &ParamType) -> Result<Value> {
    if value.is_exactly(ty) {
        return Ok(value);
    }
    match value {
        Value::Str(text) => coerce_literal(&text, ty),
        other => Err(ConsoleError::CoercionFailure {
            argument: other.to_string(),
            expected: ty.to_string(),
            reason: format!("Value is of type {}.", other.type_name()),
        }),
    }
}

fn coerce_literal(text: &str, ty: &ParamType) -> Result<Value> {
    match ty {
        ParamType::Int => parse_number(text, ty).map(Value::Int),
        ParamType::Float => parse_number(text, ty).map(Value::Float),
        ParamType::Double => parse_number(text, ty).map(Value::Double),
        ParamType::Bool => parse_bool(text)
            .map(Value::Bool)
            .ok_or_else(|| failure(text, ty, "Expected true or false.")),
        ParamType::Enum(enum_type) => enum_type
            .parse(text)
            .map(|member| Value::Enum {
                type_name: enum_type.name,
                member,
            })
            .ok_or_else(|| {
                let reason = format!("Expected one of: {}.", enum_type.members.join(", "));
                failure(text, ty, &reason)
            }),
        ParamType::Any | ParamType::Str => Ok(Value::Str(text.to_string())),
        ParamType::Object(_) => Err(ConsoleError::UnsupportedParameterType {
            argument: text.to_string(),
            expected: ty.to_string(),
        }),
    }
}

fn parse_number<N>(text: &str, ty: &ParamType) -> Result<N>
where
    N: FromStr,
    N::Err: std::fmt::Display,
{
    text.trim()
        .parse()
        .map_err(|e: N::Err| failure(text, ty, &format!("{e}.")))
}

fn parse_bool(text: &str) -> Option<bool> {
    let text = text.trim();
    if text.eq_ignore_ascii_case("true") {
        Some(true)
    } else if text.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

fn failure(text: &str, ty: &ParamType, reason: &str) -> ConsoleError {
    ConsoleError::CoercionFailure {
        argument: text.to_string(),
        expected: ty.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::EnumType;
    use pretty_assertions::assert_eq;

    const MODE: EnumType = EnumType::new("Mode", &["Idle", "Cruise", "Warp"]);

    fn param(ty: ParamType) -> Param {
        Param { name: "p", ty }
    }

    fn lit(s: &str) -> Option<Value> {
        Some(Value::from(s))
    }

    #[test]
    fn test_literals_convert_to_declared_types() {
        let params = [
            param(ParamType::Int),
            param(ParamType::Float),
            param(ParamType::Double),
            param(ParamType::Bool),
            param(ParamType::Enum(MODE)),
            param(ParamType::Str),
            param(ParamType::Any),
        ];
        let args = vec![
            lit("-3"),
            lit("2.5"),
            lit("0.125"),
            lit("TRUE"),
            lit("warp"),
            lit("hello"),
            lit("raw"),
        ];

        let coerced = try_coerce(args, &params).unwrap();
        assert_eq!(
            coerced,
            vec![
                Value::Int(-3),
                Value::Float(2.5),
                Value::Double(0.125),
                Value::Bool(true),
                Value::Enum { type_name: "Mode", member: "Warp" },
                Value::from("hello"),
                Value::from("raw"),
            ]
        );
    }

    #[test]
    fn test_values_of_exact_type_pass_through() {
        let coerced =
            try_coerce(vec![Some(Value::Float(1.5))], &[param(ParamType::Float)]).unwrap();
        assert_eq!(coerced, vec![Value::Float(1.5)]);
    }

    #[test]
    fn test_unparsable_literal_is_a_coercion_failure() {
        let err = try_coerce(vec![lit("abc")], &[param(ParamType::Float)]).unwrap_err();
        match err {
            ConsoleError::CoercionFailure { argument, expected, .. } => {
                assert_eq!(argument, "abc");
                assert_eq!(expected, "float");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        assert!(matches!(
            try_coerce(vec![lit("maybe")], &[param(ParamType::Bool)]),
            Err(ConsoleError::CoercionFailure { .. })
        ));
        assert!(matches!(
            try_coerce(vec![lit("Reverse")], &[param(ParamType::Enum(MODE))]),
            Err(ConsoleError::CoercionFailure { .. })
        ));
    }

    #[test]
    fn test_non_string_mismatch_is_a_coercion_failure() {
        let err = try_coerce(vec![Some(Value::Int(1))], &[param(ParamType::Bool)]).unwrap_err();
        assert!(matches!(err, ConsoleError::CoercionFailure { .. }));
    }

    #[test]
    fn test_object_parameter_cannot_be_parsed_from_text() {
        let err =
            try_coerce(vec![lit("here")], &[param(ParamType::Object("Vector3"))]).unwrap_err();
        assert!(matches!(err, ConsoleError::UnsupportedParameterType { .. }));
    }

    #[test]
    fn test_missing_value_is_a_null_argument() {
        let err = try_coerce(
            vec![lit("1"), None],
            &[param(ParamType::Int), param(ParamType::Int)],
        )
        .unwrap_err();
        assert!(matches!(err, ConsoleError::NullArgument { index: 1, .. }));
    }

    #[test]
    fn test_first_failure_aborts() {
        let err = try_coerce(
            vec![lit("x"), None],
            &[param(ParamType::Int), param(ParamType::Int)],
        )
        .unwrap_err();
        assert!(matches!(err, ConsoleError::CoercionFailure { .. }));
    }
}
