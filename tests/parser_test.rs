use stalemake::parser::{parse_str, Buildfile, Command, Rule};
use stalemake::BuildError;

#[cfg(test)]
mod tests {
    use super::*;

    const BUILDFILE: &str = "\
# components
out/app.wasm out/app.d.ts: out/lib.wasm src
\tcargo component build
\t-wasm-tools strip out/app.wasm

out/lib.wasm: lib
\t@echo building lib
\tcargo component build -p lib

clean:
\trm -rf out
";

    #[test]
    fn parses_rules_and_commands() {
        let file = parse_str(BUILDFILE).unwrap();
        assert_eq!(file.rules.len(), 3);

        let app = &file.rules[0];
        assert_eq!(app.name(), Some("out/app.wasm"));
        assert_eq!(app.targets, vec!["out/app.wasm", "out/app.d.ts"]);
        assert_eq!(app.prerequisites, vec!["out/lib.wasm", "src"]);
        assert_eq!(app.commands.len(), 2);
        assert_eq!(app.line, 2);

        let clean = file.rule("clean").unwrap();
        assert!(clean.prerequisites.is_empty());
        assert_eq!(clean.commands[0].line, "rm -rf out");
        assert_eq!(file.default_target(), Some("out/app.wasm"));
    }

    #[test]
    fn command_prefixes() {
        assert_eq!(
            Command::parse("\t-@ cargo test"),
            Command {
                line: "cargo test".to_string(),
                ignore_errors: true,
                silent: true,
            }
        );

        let plain = Command::parse("    echo hi");
        assert_eq!(plain.line, "echo hi");
        assert!(!plain.ignore_errors);
        assert!(!plain.silent);
    }

    #[test]
    fn dependency_map_links_rules_through_targets() {
        let file = parse_str(BUILDFILE).unwrap();
        let map = file.dependency_map().unwrap();

        assert_eq!(map.get("out/app.wasm").unwrap().dependencies, vec!["out/lib.wasm"]);
        assert!(map.get("out/lib.wasm").unwrap().dependencies.is_empty());
        assert_eq!(map.all_dependencies(), vec!["out/lib.wasm"]);
    }

    #[test]
    fn secondary_target_maps_to_owning_rule() {
        let file = parse_str("a b:\n\ttouch a b\nc: b\n\ttouch c\n").unwrap();
        let map = file.dependency_map().unwrap();
        assert_eq!(map.get("c").unwrap().dependencies, vec!["a"]);
        assert_eq!(file.owner_of("b").unwrap().name(), Some("a"));
    }

    #[test]
    fn command_before_target() {
        match parse_str("\techo hi\nall:\n") {
            Err(BuildError::Syntax { line, .. }) => assert_eq!(line, 1),
            other => panic!("expected syntax error, got {:?}", other),
        }
    }

    #[test]
    fn missing_colon_and_missing_target() {
        assert!(matches!(
            parse_str("all\n"),
            Err(BuildError::Syntax { line: 1, .. })
        ));
        assert!(matches!(
            parse_str("\n: src\n"),
            Err(BuildError::Syntax { line: 2, .. })
        ));
    }

    #[test]
    fn target_declared_twice() {
        match parse_str("a:\n\ttrue\nb a:\n\ttrue\n") {
            Err(BuildError::Syntax { line, message }) => {
                assert_eq!(line, 3);
                assert!(message.contains("'a'"), "{}", message);
            }
            other => panic!("expected syntax error, got {:?}", other),
        }
    }

    #[test]
    fn rule_without_targets_has_no_name() {
        let rule = Rule {
            targets: vec![],
            prerequisites: vec!["src".to_string()],
            commands: vec![],
            line: 7,
        };
        assert_eq!(rule.name(), None);

        let file = Buildfile { rules: vec![rule] };
        assert_eq!(file.default_target(), None);
        match file.dependency_map() {
            Err(BuildError::Configuration(msg)) => assert!(msg.contains("line 7"), "{}", msg),
            other => panic!("expected configuration error, got {:?}", other),
        }
    }

    #[test]
    fn empty_file_has_no_rules() {
        let file = parse_str("# nothing\n\n").unwrap();
        assert!(file.rules.is_empty());
        assert_eq!(file.default_target(), None);
    }
}
