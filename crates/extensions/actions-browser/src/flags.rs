//! Default action list.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use webhands_protocols::Action;

use crate::actions::{
    ClickElementAction, ExtractAction, GoToUrlAction, InputTextAction, KeyPressAction,
    PageBackAction, PageForwardAction, PdfAction, RefreshPageAction, ScrollAction,
    SelectOptionAction, TaskCompleteValidationAction, ThinkAction,
};

/// Opt-in actions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionFlags {
    /// Register `analyzePdf`.
    #[serde(default)]
    pub pdf_analysis: bool,
}

impl ActionFlags {
    pub fn with_pdf_analysis(mut self, enabled: bool) -> Self {
        self.pdf_analysis = enabled;
        self
    }
}

/// The built-in actions, in the order they are shown to the model.
pub fn builtin_actions(flags: &ActionFlags) -> Vec<Arc<dyn Action>> {
    let mut actions: Vec<Arc<dyn Action>> = vec![
        Arc::new(GoToUrlAction::new()),
        Arc::new(PageBackAction::new()),
        Arc::new(PageForwardAction::new()),
        Arc::new(RefreshPageAction::new()),
        Arc::new(ExtractAction::new()),
        Arc::new(ClickElementAction::new()),
        Arc::new(SelectOptionAction::new()),
        Arc::new(ScrollAction::new()),
        Arc::new(InputTextAction::new()),
        Arc::new(KeyPressAction::new()),
        Arc::new(ThinkAction::new()),
        Arc::new(TaskCompleteValidationAction::new()),
    ];

    if flags.pdf_analysis {
        actions.push(Arc::new(PdfAction::new()));
    }

    actions
}
