/// Push an error if `value` is outside `[min, max]`.
pub(crate) fn validate_range(
    errors: &mut Vec<String>,
    name: &str,
    value: usize,
    min: usize,
    max: usize,
) {
    if value < min || value > max {
        errors.push(format!("{name} = {value} is out of range [{min}, {max}]"));
    }
}
