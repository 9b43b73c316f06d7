use std::fmt::Write;

#[derive(Debug, Clone)]
struct OptionGuide {
    flag: &'static str,
    description: &'static str,
}

#[derive(Debug, Clone)]
struct CommandGuide {
    names: &'static [&'static str],
    summary: &'static str,
    usage: &'static [&'static str],
    options: &'static [OptionGuide],
    examples: &'static [&'static str],
}

const GLOBAL_OPTIONS: &[OptionGuide] = &[
    OptionGuide {
        flag: "-h, --help",
        description: "Show contextual help information.",
    },
    OptionGuide {
        flag: "-V, --version",
        description: "Print the oomangle version.",
    },
    OptionGuide {
        flag: "--config <file>",
        description: "Load primitive tags and name substitutions from a YAML file.",
    },
    OptionGuide {
        flag: "--log-format <format>",
        description: "Select log output format (auto, text, json).",
    },
    OptionGuide {
        flag: "--log-level <level>",
        description: "Set log verbosity (error, warn, info, debug, trace).",
    },
];

const COMMAND_GUIDES: &[CommandGuide] = &[
    CommandGuide {
        names: &["entity", "e"],
        summary: "Print the symbol of a field or method.",
        usage: &["oomangle entity <owner> <name[.descriptor]> [--static] [--descriptor <desc>]"],
        options: &[
            OptionGuide {
                flag: "--static",
                description: "The entity has no receiver.",
            },
            OptionGuide {
                flag: "-d, --descriptor <desc>",
                description: "JVM descriptor of the entity (overrides one embedded in the name).",
            },
        ],
        examples: &[
            "oomangle entity java/lang/Object 'equals.(Ljava/lang/Object;)Z'",
            "oomangle entity java/lang/Integer MAX_VALUE --static --descriptor I",
            "oomangle entity '<global>' main --static -d '([Ljava/lang/String;)V'",
        ],
    },
    CommandGuide {
        names: &["vtable", "v"],
        summary: "Print the symbol of a class's virtual table.",
        usage: &["oomangle vtable <class>"],
        options: &[],
        examples: &["oomangle vtable java/lang/Object"],
    },
    CommandGuide {
        names: &["batch"],
        summary: "Mangle every entity and vtable listed in a YAML manifest.",
        usage: &["oomangle batch <manifest.yaml>"],
        options: &[],
        examples: &["oomangle --config mangle.yaml batch symbols.yaml"],
    },
    CommandGuide {
        names: &["help"],
        summary: "Show general help or details for a command.",
        usage: &["oomangle help [command]"],
        options: &[],
        examples: &["oomangle help entity"],
    },
    CommandGuide {
        names: &["version"],
        summary: "Print the oomangle version.",
        usage: &["oomangle version"],
        options: &[],
        examples: &[],
    },
];

pub(crate) fn render_general_help() -> String {
    let mut out = String::new();
    out.push_str("oomangle – Itanium C++ ABI symbols for Java classes and members\n\n");
    out.push_str("USAGE:\n  oomangle [global options] <command> [options]\n\n");
    out.push_str("COMMANDS:\n");
    for guide in COMMAND_GUIDES {
        let canonical = guide.names[0];
        let _ = writeln!(out, "  {canonical:9} {}", guide.summary);
    }
    out.push('\n');
    out.push_str("GLOBAL OPTIONS:\n");
    for option in GLOBAL_OPTIONS {
        let _ = writeln!(out, "  {:22} {}", option.flag, option.description);
    }
    out.push('\n');
    out.push_str("Use `oomangle help <command>` to view detailed usage and examples.");
    out.push('\n');
    out
}

pub(crate) fn render_command_help(topic: &str) -> Option<String> {
    let guide = find_guide(topic)?;
    let mut out = String::new();
    let canonical = guide.names[0];
    let _ = writeln!(out, "oomangle {canonical} – {}", guide.summary);
    out.push('\n');

    out.push_str("USAGE:\n");
    for usage in guide.usage {
        let _ = writeln!(out, "  {usage}");
    }

    if guide.names.len() > 1 {
        out.push('\n');
        out.push_str("ALIASES:\n");
        for alias in &guide.names[1..] {
            let _ = writeln!(out, "  {alias}");
        }
    }

    if !guide.options.is_empty() {
        out.push('\n');
        out.push_str("OPTIONS:\n");
        for option in guide.options {
            let _ = writeln!(out, "  {:24} {}", option.flag, option.description);
        }
    }

    if !guide.examples.is_empty() {
        out.push('\n');
        out.push_str("EXAMPLES:\n");
        for example in guide.examples {
            let _ = writeln!(out, "  {example}");
        }
    }
    Some(out)
}

pub(crate) fn format_unknown_topic(topic: &str) -> String {
    let mut known = COMMAND_GUIDES
        .iter()
        .map(|guide| guide.names[0])
        .collect::<Vec<_>>();
    known.sort_unstable();
    format!(
        "unknown help topic '{topic}'; available commands: {}",
        known.join(", ")
    )
}

fn find_guide(topic: &str) -> Option<&'static CommandGuide> {
    COMMAND_GUIDES.iter().find(|guide| {
        guide
            .names
            .iter()
            .any(|name| name.eq_ignore_ascii_case(topic))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn general_help_lists_every_command() {
        let help = render_general_help();
        for name in ["entity", "vtable", "batch", "help", "version"] {
            assert!(help.contains(name), "missing {name} in {help}");
        }
        assert!(help.contains("--config <file>"));
    }

    #[test]
    fn command_help_resolves_aliases() {
        let help = render_command_help("V").unwrap();
        assert!(help.starts_with("oomangle vtable"));
        assert!(render_command_help("demangle").is_none());
    }

    #[test]
    fn unknown_topic_lists_commands_sorted() {
        assert_eq!(
            format_unknown_topic("nope"),
            "unknown help topic 'nope'; available commands: batch, entity, help, version, vtable"
        );
    }
}
