use crate::lib::errors::RunnerError;

/// Header that opens the scheme section of `xcodebuild -list`.
pub const SCHEMES_MARKER: &str = "Schemes:";

/// Extract scheme names, in declaration order, from `xcodebuild -list` output.
///
/// Every non-blank line after the `Schemes:` header is a scheme.
pub fn parse_schemes(output: &str) -> Result<Vec<String>, RunnerError> {
    let mut schemes = Vec::new();
    let mut collecting = false;
    for line in output.lines() {
        let line = line.trim();
        if collecting && !line.is_empty() {
            schemes.push(line.to_string());
        }
        if line.contains(SCHEMES_MARKER) {
            collecting = true;
        }
    }

    if schemes.is_empty() {
        return Err(RunnerError::NoSchemesFound);
    }
    Ok(schemes)
}
