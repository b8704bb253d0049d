//! Timeframe command implementation.

use anyhow::Result;
use brokerkit_lib::TimeframeSpec;

/// Parse a timeframe code and print its canonical form.
pub(crate) fn show_timeframe(text: &str) -> Result<()> {
    println!("{}", render_timeframe(text)?);
    Ok(())
}

fn render_timeframe(text: &str) -> Result<String> {
    let spec = TimeframeSpec::parse(text)?;
    let approx = spec.approx_duration();
    Ok(format!(
        "Timeframe: {spec}\nAmount:    {}\nUnit:      {}\nApprox:    {} seconds",
        spec.amount(),
        spec.unit(),
        approx.num_seconds()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_timeframe() {
        let text = render_timeframe(" 4h ").unwrap();
        assert!(text.starts_with("Timeframe: 4Hour"));
        assert!(text.contains("14400 seconds"));
    }

    #[test]
    fn test_render_rejects_unknown_unit() {
        let err = render_timeframe("7Fortnight").unwrap_err();
        assert!(err.to_string().contains("7Fortnight"));
    }
}
