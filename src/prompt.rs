use dialoguer::Confirm;
use dialoguer::theme::{ColorfulTheme, SimpleTheme, Theme};
use tracing::debug;

pub const fn question(dry_run: bool) -> &'static str {
    if dry_run {
        "Confirm simulation of these actions?"
    } else {
        "Proceed with these actions?"
    }
}

/// Lists the planned actions and asks for a yes/no answer.
/// Defaults to "no"; EOF, Esc or a non-interactive stdin count as "no" too.
pub fn confirm(actions: &[String], dry_run: bool, color: bool) -> bool {
    println!("Planned cleanup actions:");
    for action in actions {
        println!("  - {action}");
    }

    let colorful = ColorfulTheme::default();
    let theme: &dyn Theme = if color { &colorful } else { &SimpleTheme };

    accepted(
        Confirm::with_theme(theme)
            .with_prompt(question(dry_run))
            .default(false)
            .wait_for_newline(true)
            .interact_opt(),
    )
}

fn accepted(answer: dialoguer::Result<Option<bool>>) -> bool {
    match answer {
        Ok(Some(yes)) => yes,
        Ok(None) => false,
        Err(e) => {
            debug!("no answer read: {e}");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn only_an_explicit_yes_confirms() {
        assert!(accepted(Ok(Some(true))));
        assert!(!accepted(Ok(Some(false))));
        assert!(!accepted(Ok(None)));
    }

    #[test]
    fn unreadable_input_means_no() {
        let eof = dialoguer::Error::IO(io::Error::from(io::ErrorKind::UnexpectedEof));
        assert!(!accepted(Err(eof)));

        let not_a_tty =
            dialoguer::Error::IO(io::Error::new(io::ErrorKind::NotConnected, "not a terminal"));
        assert!(!accepted(Err(not_a_tty)));
    }

    #[test]
    fn question_names_the_mode() {
        assert_eq!(question(true), "Confirm simulation of these actions?");
        assert_eq!(question(false), "Proceed with these actions?");
    }
}
