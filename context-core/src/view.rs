//! Visibility controller: the three panels of the widget page.

/// Which panel is visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewState {
    Loading,
    Content,
    Error,
}

impl ViewState {
    /// DOM id of the panel shown for this state.
    pub fn panel_id(self) -> &'static str {
        match self {
            ViewState::Loading => "loading",
            ViewState::Content => "content",
            ViewState::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Panel {
    pub visible: bool,
    pub inner_html: String,
}

impl Panel {
    fn new(visible: bool, inner_html: &str) -> Self {
        Self {
            visible,
            inner_html: inner_html.to_string(),
        }
    }
}

pub const LOADING_TEXT: &str = "Loading customer context...";
pub const ERROR_TEXT: &str = "Unable to load customer data.";

/// The host page the widget draws into. Starts with the loading panel shown,
/// as the host markup does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetPage {
    loading: Panel,
    content: Panel,
    error: Panel,
}

impl Default for WidgetPage {
    fn default() -> Self {
        Self::new()
    }
}

impl WidgetPage {
    pub fn new() -> Self {
        Self {
            loading: Panel::new(true, LOADING_TEXT),
            content: Panel::new(false, ""),
            error: Panel::new(false, ERROR_TEXT),
        }
    }

    /// Show exactly the panel for `state`. Any transition is allowed.
    pub fn set_view(&mut self, state: ViewState) {
        self.loading.visible = state == ViewState::Loading;
        self.content.visible = state == ViewState::Content;
        self.error.visible = state == ViewState::Error;
    }

    /// The visible panel. Falls back to `Loading` only if nothing is shown,
    /// which `set_view` never produces.
    pub fn view(&self) -> ViewState {
        if self.error.visible {
            ViewState::Error
        } else if self.content.visible {
            ViewState::Content
        } else {
            ViewState::Loading
        }
    }

    pub fn panel(&self, state: ViewState) -> &Panel {
        match state {
            ViewState::Loading => &self.loading,
            ViewState::Content => &self.content,
            ViewState::Error => &self.error,
        }
    }

    /// Replace the content panel's markup. Visibility is left alone.
    pub fn set_content_html(&mut self, html: String) {
        self.content.inner_html = html;
    }

    pub fn content_html(&self) -> &str {
        &self.content.inner_html
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [ViewState; 3] = [ViewState::Loading, ViewState::Content, ViewState::Error];

    #[test]
    fn test_initial_page_shows_loading() {
        let page = WidgetPage::new();
        assert_eq!(page.view(), ViewState::Loading);
        assert!(!page.panel(ViewState::Content).visible);
        assert!(!page.panel(ViewState::Error).visible);
    }

    #[test]
    fn test_exactly_one_panel_visible_after_any_transition() {
        let mut page = WidgetPage::new();
        for from in ALL {
            for to in ALL {
                page.set_view(from);
                page.set_view(to);
                let visible: Vec<ViewState> =
                    ALL.into_iter().filter(|s| page.panel(*s).visible).collect();
                assert_eq!(visible, vec![to]);
                assert_eq!(page.view(), to);
            }
        }
    }
}
