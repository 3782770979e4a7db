use super::{Argument, SuggestContext};
use crate::value::{Value, ValueKind};

const NUM_HINT: &str = "[num]";
const TEXT_HINT: &str = "[text]";

/// Any non-empty token, as text.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringArgument;

impl Argument for StringArgument {
    fn name(&self) -> &str {
        "String"
    }

    fn kind(&self) -> ValueKind {
        ValueKind::Text
    }

    fn convert(&self, token: &str) -> Option<Value> {
        (!token.is_empty()).then(|| Value::Text(token.to_string()))
    }

    fn suggest(&self, ctx: &SuggestContext<'_>) -> Vec<String> {
        if ctx.pending().is_empty() {
            vec![TEXT_HINT.to_string()]
        } else {
            Vec::new()
        }
    }
}

macro_rules! numeric_argument {
    ($(#[$doc:meta])* $ty:ident, $name:literal, $kind:ident, $prim:ty, $variant:ident, $finite:expr, $fractional:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $ty;

        impl Argument for $ty {
            fn name(&self) -> &str {
                $name
            }

            fn kind(&self) -> ValueKind {
                ValueKind::$kind
            }

            fn convert(&self, token: &str) -> Option<Value> {
                let n = token.parse::<$prim>().ok()?;
                let finite: fn($prim) -> bool = $finite;
                finite(n).then_some(Value::$variant(n))
            }

            fn suggest(&self, ctx: &SuggestContext<'_>) -> Vec<String> {
                if numeric_prefix(ctx.pending(), $fractional) {
                    vec![NUM_HINT.to_string()]
                } else {
                    Vec::new()
                }
            }
        }
    };
}

numeric_argument!(
    /// 32-bit signed integer.
    IntegerArgument, "Integer", Int, i32, Int, |_| true, false
);
numeric_argument!(
    /// 64-bit signed integer.
    LongArgument, "Long", Long, i64, Long, |_| true, false
);
numeric_argument!(
    /// Finite 32-bit float.
    FloatArgument, "Float", Float, f32, Float, f32::is_finite, true
);
numeric_argument!(
    /// Finite 64-bit float.
    DoubleArgument, "Double", Double, f64, Double, f64::is_finite, true
);

/// Whether `pending` could still grow into a number: empty, or an optional
/// sign followed by digits (plus `.` and exponent characters when
/// `fractional`).
fn numeric_prefix(pending: &str, fractional: bool) -> bool {
    let digits = pending.strip_prefix(['+', '-']).unwrap_or(pending);
    digits.chars().all(|c| {
        c.is_ascii_digit() || (fractional && matches!(c, '.' | 'e' | 'E' | '+' | '-'))
    })
}

/// `true` or `false`, case-insensitive.
#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanArgument;

impl Argument for BooleanArgument {
    fn name(&self) -> &str {
        "Boolean"
    }

    fn kind(&self) -> ValueKind {
        ValueKind::Bool
    }

    fn convert(&self, token: &str) -> Option<Value> {
        if token.eq_ignore_ascii_case("true") {
            Some(Value::Bool(true))
        } else if token.eq_ignore_ascii_case("false") {
            Some(Value::Bool(false))
        } else {
            None
        }
    }

    fn suggest(&self, ctx: &SuggestContext<'_>) -> Vec<String> {
        let pending = ctx.pending().to_ascii_lowercase();
        ["true", "false"]
            .into_iter()
            .filter(|c| c.starts_with(&pending))
            .map(str::to_string)
            .collect()
    }
}
