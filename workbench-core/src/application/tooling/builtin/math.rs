use super::super::result::ToolFailure;
use super::super::schema::Arguments;
use serde_json::Value;

fn operands(args: &Arguments) -> Result<(i64, i64), ToolFailure> {
    Ok((args.integer("a")?, args.integer("b")?))
}

fn overflow(op: &str, a: i64, b: i64) -> ToolFailure {
    ToolFailure::handler(format!("integer overflow computing {a} {op} {b}"))
}

pub(super) fn add(args: &Arguments) -> Result<Value, ToolFailure> {
    let (a, b) = operands(args)?;
    a.checked_add(b)
        .map(Value::from)
        .ok_or_else(|| overflow("+", a, b))
}

pub(super) fn subtract(args: &Arguments) -> Result<Value, ToolFailure> {
    let (a, b) = operands(args)?;
    a.checked_sub(b)
        .map(Value::from)
        .ok_or_else(|| overflow("-", a, b))
}

pub(super) fn multiply(args: &Arguments) -> Result<Value, ToolFailure> {
    let (a, b) = operands(args)?;
    a.checked_mul(b)
        .map(Value::from)
        .ok_or_else(|| overflow("*", a, b))
}

pub(super) fn divide(args: &Arguments) -> Result<Value, ToolFailure> {
    let (a, b) = operands(args)?;
    if b == 0 {
        return Err(ToolFailure::handler("integer division by zero"));
    }
    floor_div(a, b)
        .map(Value::from)
        .ok_or_else(|| overflow("//", a, b))
}

/// Integer division rounding toward negative infinity.
///
/// Returns `None` for a zero divisor or `i64::MIN / -1`.
pub fn floor_div(a: i64, b: i64) -> Option<i64> {
    let quotient = a.checked_div(b)?;
    if a % b != 0 && ((a < 0) != (b < 0)) {
        Some(quotient - 1)
    } else {
        Some(quotient)
    }
}
