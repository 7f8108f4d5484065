//! Help text rendering.

use crate::spec::param::Param;

/// Render the full help text:
///
/// ```text
/// [version message + blank line]
/// <prefix>
///   <appname> <arg_look> <arg_look> ...
///
/// PARAMETERS:
///
/// \t<arg_look>:  <help>. [Default: <value>]
/// ...
/// <suffix>
/// ```
pub fn render(
    appname: Option<&str>,
    params: &[Param],
    version: Option<&str>,
    prefix: &str,
    suffix: &str,
) -> String {
    let looks: Vec<String> = params.iter().map(Param::arg_look).collect();
    let usage = match appname {
        Some(app) => format!("  {} {}\n\n", app, looks.join(" ")),
        None => format!("  {}\n\n", looks.join(" ")),
    };
    let lines: String = params
        .iter()
        .map(|p| format!("\n{}", p.help_line()))
        .collect();

    let mut out = String::new();
    if let Some(version) = version {
        out.push_str(version);
        out.push_str("\n\n");
    }
    out.push_str(prefix);
    out.push('\n');
    out.push_str(&usage);
    out.push_str("PARAMETERS:\n");
    out.push_str(&lines);
    out.push('\n');
    out.push_str(suffix);
    out.push_str("\n\n");
    out
}

#[cfg(test)]
mod tests {
    use crate::spec::SpecBuilder;

    #[test]
    fn usage_line_lists_every_parameter_in_order() {
        let mut b = SpecBuilder::new("copy");
        b.add_flag("-f", false, "overwrite")
            .unwrap()
            .add_string_here("src", None, "source")
            .unwrap()
            .add_string_here("dest", Some("."), "destination")
            .unwrap();
        let help = b.finalize().unwrap().help_text();

        assert!(help.starts_with("USAGE:\n"));
        assert!(help.contains("  copy -[NO|no][-]f SRC DEST? -?[--help]\n"));
        assert!(help.contains("PARAMETERS:\n"));
        assert!(help.contains("\tSRC:  source.\n"));
        assert!(help.contains("\tDEST?:  destination. Default: .\n"));
        assert!(help.trim_end().ends_with("--------"));
    }

    #[test]
    fn version_heads_the_help() {
        let mut b = SpecBuilder::new("copy")
            .help_prefix("Usage")
            .help_suffix("end");
        b.add_version(("-V", "--version"), Some("2.1"), None).unwrap();
        let help = b.finalize().unwrap().help_text();
        assert!(help.starts_with("copy: Version 2.1\n\nUsage\n"));
        assert!(help.trim_end().ends_with("end"));
    }
}
