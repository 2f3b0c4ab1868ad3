use proptest::prelude::*;
use sdk::errors::{BakebotErrorExt, EngineError};

// User hints are shown verbatim in the chat transcript, so they must never
// echo the detail string carried by the error.
proptest! {
    #[test]
    fn test_error_user_hint_completeness(error_str in "[a-zA-Z0-9_]{12,40}") {
        let errs = vec![
            EngineError::Config(error_str.clone()),
            EngineError::MissingCredential(error_str.clone()),
            EngineError::Classification(error_str.clone()),
            EngineError::RecipeFetchProtocol(error_str.clone()),
            EngineError::RecipeNotFound(error_str.clone()),
            EngineError::LLMProvider(error_str.clone()),
            EngineError::RecipeProvider(error_str.clone()),
            EngineError::Network(error_str.clone()),
        ];

        for err in errs {
            let hint = err.user_hint();
            prop_assert!(!hint.is_empty());
            prop_assert!(!hint.contains(&error_str));
        }
    }
}

proptest! {
    #[test]
    fn test_only_setup_errors_are_fatal(detail in "\\PC*") {
        prop_assert!(!EngineError::Config(detail.clone()).is_recoverable());
        prop_assert!(!EngineError::MissingCredential(detail.clone()).is_recoverable());
        prop_assert!(EngineError::RecipeNotFound(detail.clone()).is_recoverable());
        prop_assert!(EngineError::LLMProvider(detail).is_recoverable());
    }
}
