//! Contrast command for picking text colors.

use std::io::Write;

use anyhow::{Context, Result};
use sf_core::contrasting_color;

pub fn run<W: Write>(writer: &mut W, colors: &[String]) -> Result<()> {
    for color in colors {
        let foreground =
            contrasting_color(color).with_context(|| format!("cannot pick a color for {color}"))?;
        writeln!(writer, "{color} {foreground}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use insta::assert_snapshot;

    #[test]
    fn prints_one_line_per_color() {
        let colors = ["#00000000", "#ffffff", "#000000", "#3a7bd5"].map(String::from);
        let mut output = Vec::new();
        run(&mut output, &colors).unwrap();

        let output = String::from_utf8(output).unwrap();
        assert_snapshot!(output, @r"
        #00000000 #606060
        #ffffff #000000
        #000000 #ffffff
        #3a7bd5 #ffffff
        ");
    }

    #[test]
    fn stops_at_malformed_color() {
        let colors = ["#ffffff", "#xyz"].map(String::from);
        let mut output = Vec::new();
        let err = run(&mut output, &colors).unwrap_err();

        assert!(err.to_string().contains("cannot pick a color for #xyz"));
        assert_eq!(String::from_utf8(output).unwrap(), "#ffffff #000000\n");
    }
}
