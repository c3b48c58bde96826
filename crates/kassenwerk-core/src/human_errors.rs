// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Cashier-facing error messages.
//
// Every technical error is mapped to a short sentence plus a concrete next
// step that can be done at the counter. `classify_error` drives both the
// `retriable` flag and the caller's own retry decisions.

use crate::error::KassenwerkError;
use crate::types::ErrorClass;

/// A human-readable error with a plain message and an actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// One-line summary (shown as a heading on the till).
    pub message: String,
    /// What the cashier should try next.
    pub suggestion: String,
    /// Whether simply trying again is worthwhile.
    pub retriable: bool,
    pub class: ErrorClass,
}

/// Classify a `KassenwerkError` for retry decisions.
pub fn classify_error(err: &KassenwerkError) -> ErrorClass {
    match err {
        KassenwerkError::Configuration(_) => ErrorClass::Permanent,
        KassenwerkError::CertificateFetch(_) => ErrorClass::Transient,
        KassenwerkError::Signing(_) => ErrorClass::Transient,
        // The one-shot launch already happened; a person has to look now.
        KassenwerkError::Connection { .. } => ErrorClass::UserAction,
        KassenwerkError::Transport(_) => ErrorClass::Transient,
        KassenwerkError::PrintJob(_) => ErrorClass::UserAction,
        KassenwerkError::TerminalConnection(_) => ErrorClass::UserAction,
        KassenwerkError::TerminalProtocol(_) => ErrorClass::Permanent,
        KassenwerkError::PaymentDeclined(_) => ErrorClass::Permanent,
        KassenwerkError::Serialization(_) => ErrorClass::Permanent,
        KassenwerkError::Io(io_err) => match io_err.kind() {
            std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => {
                ErrorClass::UserAction
            }
            _ => ErrorClass::Transient,
        },
    }
}

/// Convert a `KassenwerkError` into a message the person at the till can act on.
pub fn humanize_error(err: &KassenwerkError) -> HumanError {
    let class = classify_error(err);
    let retriable = class == ErrorClass::Transient;

    let (message, suggestion) = match err {
        KassenwerkError::Configuration(detail) => (
            "The till is not set up correctly.".to_string(),
            format!("Ask your administrator to check the printer and terminal settings. ({detail})"),
        ),
        KassenwerkError::CertificateFetch(_) => (
            "The printing certificate could not be downloaded.".to_string(),
            "Check the internet connection, then try again.".to_string(),
        ),
        KassenwerkError::Signing(_) => (
            "The printing service could not confirm this till.".to_string(),
            "Check the internet connection, then try again.".to_string(),
        ),
        KassenwerkError::Connection { .. } => (
            "The print helper application is not running.".to_string(),
            "Start the print helper on this computer (it may ask for permission), then try again."
                .to_string(),
        ),
        KassenwerkError::Transport(_) => (
            "The connection to the print helper was interrupted.".to_string(),
            "Try again. If this keeps happening, restart the print helper.".to_string(),
        ),
        KassenwerkError::PrintJob(detail) => humanize_print_detail(detail),
        KassenwerkError::TerminalConnection(_) => (
            "The card terminal cannot be reached.".to_string(),
            "Make sure the card terminal is switched on and its cable or Wi-Fi is connected."
                .to_string(),
        ),
        KassenwerkError::TerminalProtocol(_) => (
            "The card terminal gave an unexpected answer.".to_string(),
            "Check the terminal screen before charging again, the payment may have gone through."
                .to_string(),
        ),
        KassenwerkError::PaymentDeclined(reason) => (
            "The payment was declined.".to_string(),
            format!("Ask the customer for another card or payment method. ({reason})"),
        ),
        KassenwerkError::Io(io_err) if io_err.kind() == std::io::ErrorKind::NotFound => (
            "A settings file could not be found.".to_string(),
            "Ask your administrator to restore the till configuration.".to_string(),
        ),
        KassenwerkError::Io(_) => (
            "There was a problem reading or writing a file.".to_string(),
            "Try again. If this keeps happening, the disk may be full.".to_string(),
        ),
        KassenwerkError::Serialization(_) => (
            "The till had an internal data problem.".to_string(),
            "Try again. If this keeps happening, please report it.".to_string(),
        ),
    };

    HumanError {
        message,
        suggestion,
        retriable,
        class,
    }
}

/// Map print failure details reported by the bridge to a message.
fn humanize_print_detail(detail: &str) -> (String, String) {
    let lower = detail.to_ascii_lowercase();

    if lower.contains("not found") || lower.contains("no printer") {
        (
            "The receipt printer was not found.".to_string(),
            "Check the printer is switched on and connected to this computer.".to_string(),
        )
    } else if lower.contains("paper") {
        (
            "The receipt printer is out of paper.".to_string(),
            "Load a new paper roll, then print again.".to_string(),
        )
    } else if lower.contains("empty") {
        (
            "There was nothing to print.".to_string(),
            "Try the action again from the till screen.".to_string(),
        )
    } else {
        (
            "The receipt could not be printed.".to_string(),
            format!("Check the printer, then print again. (Detail: {detail})"),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_failure_asks_for_the_bridge() {
        let err = KassenwerkError::Connection {
            attempts: 2,
            source: Box::new(KassenwerkError::Transport("refused".into())),
        };
        let human = humanize_error(&err);
        assert_eq!(human.class, ErrorClass::UserAction);
        assert!(!human.retriable);
        assert!(human.suggestion.contains("print helper"));
    }

    #[test]
    fn certificate_fetch_is_transient() {
        let human = humanize_error(&KassenwerkError::CertificateFetch("timeout".into()));
        assert_eq!(human.class, ErrorClass::Transient);
        assert!(human.retriable);
    }

    #[test]
    fn declined_payment_is_permanent() {
        let err = KassenwerkError::PaymentDeclined("insufficient funds".into());
        let human = humanize_error(&err);
        assert_eq!(human.class, ErrorClass::Permanent);
        assert!(human.suggestion.contains("insufficient funds"));
    }

    #[test]
    fn out_of_paper_is_recognised() {
        let err = KassenwerkError::PrintJob("printer reports paper out".into());
        let human = humanize_error(&err);
        assert!(human.message.contains("out of paper"));
    }

    #[test]
    fn missing_config_file_needs_an_administrator() {
        let err = KassenwerkError::Io(std::io::Error::from(std::io::ErrorKind::NotFound));
        assert_eq!(classify_error(&err), ErrorClass::UserAction);
    }
}
