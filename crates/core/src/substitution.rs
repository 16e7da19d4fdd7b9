use crate::config::Placeholder;

/// Builds the concrete process arguments for the current input.
///
/// Every literal occurrence of the placeholder in every template argument is
/// replaced with the input. Invalid UTF-8 in the input is replaced lossily.
pub fn build_args(template: &[String], placeholder: &Placeholder, input: &[u8]) -> Vec<String> {
    let input = String::from_utf8_lossy(input);

    template
        .iter()
        .map(|argument| argument.replace(placeholder.as_str(), &input))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template(args: &[&str]) -> Vec<String> {
        args.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_replaces_all_occurrences() {
        let args = build_args(&template(&["echo", "{{}}-{{}}"]), &Placeholder::default(), b"x");
        assert_eq!(args, vec!["echo", "x-x"]);
    }

    #[test]
    fn test_arguments_without_placeholder_unchanged() {
        let args = build_args(
            &template(&["grep", "-i", "{{}}", "file.txt"]),
            &Placeholder::default(),
            b"needle",
        );
        assert_eq!(args, vec!["grep", "-i", "needle", "file.txt"]);
    }

    #[test]
    fn test_input_is_not_a_pattern() {
        // `$0` and `{}` must come through untouched
        let args = build_args(&template(&["echo", "{{}}"]), &Placeholder::default(), b"$0 {}");
        assert_eq!(args, vec!["echo", "$0 {}"]);
    }

    #[test]
    fn test_custom_placeholder() {
        let placeholder = Placeholder::new("%%").unwrap();
        let args = build_args(&template(&["echo", "a%%b", "{{}}"]), &placeholder, b"-");
        assert_eq!(args, vec!["echo", "a-b", "{{}}"]);
    }

    #[test]
    fn test_non_overlapping_replacement() {
        let placeholder = Placeholder::new("%%").unwrap();
        let args = build_args(&template(&["%%%"]), &placeholder, b"x");
        assert_eq!(args, vec!["x%"]);
    }

    #[test]
    fn test_invalid_utf8_input() {
        let args = build_args(&template(&["{{}}"]), &Placeholder::default(), &[b'a', 0xFF]);
        assert_eq!(args, vec!["a\u{FFFD}"]);
    }
}
