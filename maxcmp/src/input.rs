//! Input-file loader.
//!
//! A file holds one comma-separated list of decimal numbers, each with
//! an optional leading sign and at most one fractional digit. Every
//! value is scaled by the session scale and truncated to an integer, so
//! the default scale of 10 gives a one-decimal fixed-point range.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use regex::Regex;

pub fn load_inputs(path: &Path, scale: u32) -> Result<Vec<i64>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read inputs from {}", path.display()))?;
    parse_inputs(&content, scale)
}

pub fn parse_inputs(content: &str, scale: u32) -> Result<Vec<i64>> {
    let re = Regex::new(r"^([+-]?)(\d+)(?:\.(\d))?$").context("failed to compile input regex")?;

    let mut inputs = Vec::new();
    for raw in content.trim().split(',') {
        let entry = raw.trim();
        let caps = re
            .captures(entry)
            .with_context(|| format!("invalid input entry '{entry}'"))?;

        let negative = &caps[1] == "-";
        let whole: i64 = caps[2]
            .parse()
            .with_context(|| format!("input '{entry}' overflows"))?;
        let frac: i64 = caps
            .get(3)
            .map(|m| m.as_str().parse())
            .transpose()
            .expect("regex restricts the fraction to one digit")
            .unwrap_or(0);
        if frac != 0 && scale % 10 != 0 {
            bail!("fractional input '{entry}' needs a scale divisible by 10, got {scale}");
        }

        let scaled = whole
            .checked_mul(scale as i64)
            .and_then(|v| v.checked_add(frac * (scale as i64 / 10)))
            .with_context(|| format!("input '{entry}' overflows after scaling"))?;
        inputs.push(if negative { -scaled } else { scaled });
    }
    if inputs.is_empty() {
        bail!("no inputs found");
    }
    Ok(inputs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_mixed_list_at_scale_ten() {
        assert_eq!(
            parse_inputs("-11, -9.7, 5, 10.1, 857.4", 10).unwrap(),
            vec![-110, -97, 50, 101, 8574]
        );
    }

    #[test]
    fn parses_signs_and_fractions() {
        assert_eq!(parse_inputs("+5.5", 10).unwrap(), vec![55]);
        assert_eq!(parse_inputs("-0.1", 10).unwrap(), vec![-1]);
        assert_eq!(parse_inputs("0", 10).unwrap(), vec![0]);
        assert_eq!(parse_inputs("7", 100).unwrap(), vec![700]);
        assert_eq!(parse_inputs("7.3", 100).unwrap(), vec![730]);
    }

    #[test]
    fn integer_only_at_scale_one() {
        assert_eq!(parse_inputs("42, -3", 1).unwrap(), vec![42, -3]);
        assert!(parse_inputs("4.2", 1).is_err());
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_inputs("abc", 10).is_err());
        assert!(parse_inputs("1.23", 10).is_err());
        assert!(parse_inputs("1..2", 10).is_err());
        assert!(parse_inputs("", 10).is_err());
        assert!(parse_inputs("1,,2", 10).is_err());
    }

    #[test]
    fn rejects_overflow() {
        assert!(parse_inputs("99999999999999999999", 10).is_err());
        assert!(parse_inputs(&format!("{}", i64::MAX), 10).is_err());
    }
}
