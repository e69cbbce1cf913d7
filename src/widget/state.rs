use crate::models::chat::ChatTurn;
use crate::models::relay::RelayRequest;
use super::format::{ escape_html, format_message };

pub const TOGGLE_LABEL_MINIMIZED: &str = "+";
pub const TOGGLE_LABEL_OPEN: &str = "−";

/// Labels of the canned buttons under the input; each sends its label.
pub const QUICK_ACTIONS: [&str; 3] = ["Current Rates", "Calculator", "Apply Now"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitSource {
    /// The input inside the open panel.
    Panel,
    /// The input shown while the panel is minimized. Sending from it
    /// opens the panel.
    Collapsed,
    QuickAction,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEntry {
    Message {
        role: String,
        html: String,
    },
    /// Placeholder shown while a request is in flight.
    Typing,
}

/// Everything the panel shows and remembers for one page session.
#[derive(Debug, Clone)]
pub struct WidgetState {
    pub history: Vec<ChatTurn>,
    pub view: Vec<ViewEntry>,
    pub is_minimized: bool,
    pub is_loading: bool,
    pub input_focused: bool,
}

impl WidgetState {
    /// A minimized panel showing only the welcome message. The welcome is
    /// never sent upstream.
    pub fn new(welcome_message: &str) -> Self {
        let mut state = Self {
            history: Vec::new(),
            view: Vec::new(),
            is_minimized: true,
            is_loading: false,
            input_focused: false,
        };
        render_turn(&mut state, &ChatTurn::assistant(welcome_message));
        state
    }

    pub fn toggle_label(&self) -> &'static str {
        if self.is_minimized { TOGGLE_LABEL_MINIMIZED } else { TOGGLE_LABEL_OPEN }
    }

    pub fn is_typing(&self) -> bool {
        self.view.iter().any(|entry| *entry == ViewEntry::Typing)
    }
}

/// Assistant text is trusted markup; customer text is escaped first.
pub fn render_turn(state: &mut WidgetState, turn: &ChatTurn) {
    let html = if turn.is_assistant() {
        format_message(&turn.content)
    } else {
        format_message(&escape_html(&turn.content))
    };
    state.view.push(ViewEntry::Message { role: turn.role.clone(), html });
}

pub fn toggle(state: &mut WidgetState) {
    state.is_minimized = !state.is_minimized;
    state.input_focused = !state.is_minimized;
}

fn set_loading(state: &mut WidgetState, loading: bool) {
    state.is_loading = loading;
    if loading {
        state.view.push(ViewEntry::Typing);
    } else {
        state.view.retain(|entry| *entry != ViewEntry::Typing);
    }
}

/// First half of a submit. Returns the request to send, or `None` when
/// the submit is ignored (a request is already in flight, or the text is
/// blank).
///
/// The request carries the trailing `history_window` turns that precede
/// the new one; the relay appends the new message itself.
pub fn begin_submit(
    state: &mut WidgetState,
    source: SubmitSource,
    text: &str,
    history_window: usize
) -> Option<RelayRequest> {
    if state.is_loading {
        return None;
    }
    let message = text.trim();
    if message.is_empty() {
        return None;
    }

    if source == SubmitSource::Collapsed && state.is_minimized {
        toggle(state);
    }

    let start = state.history.len().saturating_sub(history_window);
    let request = RelayRequest {
        message: message.to_string(),
        history: state.history[start..].to_vec(),
    };

    let turn = ChatTurn::user(message);
    render_turn(state, &turn);
    state.history.push(turn);
    set_loading(state, true);

    Some(request)
}

/// Second half of a submit. A failed request shows `fallback` but keeps
/// it out of the history, so the next request does not carry it.
pub fn complete_submit<E>(state: &mut WidgetState, result: Result<String, E>, fallback: &str) {
    set_loading(state, false);
    match result {
        Ok(reply) => {
            let turn = ChatTurn::assistant(reply);
            render_turn(state, &turn);
            state.history.push(turn);
        }
        Err(_) => {
            render_turn(state, &ChatTurn::assistant(fallback));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_state() -> WidgetState {
        let mut state = WidgetState::new("Welcome");
        toggle(&mut state);
        state
    }

    #[test]
    fn starts_minimized_with_welcome_only_in_view() {
        let state = WidgetState::new("Hi there!");
        assert!(state.is_minimized);
        assert_eq!(state.toggle_label(), TOGGLE_LABEL_MINIMIZED);
        assert!(state.history.is_empty());
        assert_eq!(state.view.len(), 1);
    }

    #[test]
    fn opening_focuses_input() {
        let mut state = WidgetState::new("Welcome");
        toggle(&mut state);
        assert!(!state.is_minimized);
        assert!(state.input_focused);
        assert_eq!(state.toggle_label(), TOGGLE_LABEL_OPEN);

        toggle(&mut state);
        assert!(state.is_minimized);
        assert!(!state.input_focused);
    }

    #[test]
    fn submit_while_loading_is_ignored() {
        let mut state = open_state();
        assert!(begin_submit(&mut state, SubmitSource::Panel, "first", 6).is_some());
        assert!(begin_submit(&mut state, SubmitSource::Panel, "second", 6).is_none());
        assert_eq!(state.history, vec![ChatTurn::user("first")]);
    }

    #[test]
    fn blank_submit_is_ignored() {
        let mut state = open_state();
        assert!(begin_submit(&mut state, SubmitSource::Panel, "   ", 6).is_none());
        assert!(!state.is_loading);
    }

    #[test]
    fn collapsed_submit_opens_the_panel() {
        let mut state = WidgetState::new("Welcome");
        begin_submit(&mut state, SubmitSource::Collapsed, "hello", 6).unwrap();
        assert!(!state.is_minimized);
        assert!(state.input_focused);
    }

    #[test]
    fn typing_placeholder_lives_only_while_loading() {
        let mut state = open_state();
        begin_submit(&mut state, SubmitSource::Panel, "hello", 6).unwrap();
        assert!(state.is_loading);
        assert!(state.is_typing());

        complete_submit::<()>(&mut state, Ok("Hi!".to_string()), "fallback");
        assert!(!state.is_loading);
        assert!(!state.is_typing());
        assert_eq!(state.history, vec![ChatTurn::user("hello"), ChatTurn::assistant("Hi!")]);
    }

    #[test]
    fn failure_shows_fallback_but_keeps_user_turn() {
        let mut state = open_state();
        begin_submit(&mut state, SubmitSource::Panel, "hello", 6).unwrap();
        complete_submit(&mut state, Err("boom"), "Please call us");

        assert_eq!(state.history, vec![ChatTurn::user("hello")]);
        assert_eq!(
            state.view.last(),
            Some(&ViewEntry::Message { role: "assistant".into(), html: "Please call us".into() })
        );
    }

    #[test]
    fn request_carries_trailing_window_before_the_new_turn() {
        let mut state = open_state();
        for i in 0..5 {
            begin_submit(&mut state, SubmitSource::Panel, &format!("q{}", i), 6).unwrap();
            complete_submit::<()>(&mut state, Ok(format!("a{}", i)), "fallback");
        }

        let request = begin_submit(&mut state, SubmitSource::Panel, "latest", 6).unwrap();
        assert_eq!(request.message, "latest");
        assert_eq!(request.history.len(), 6);
        assert_eq!(request.history.first(), Some(&ChatTurn::user("q2")));
        assert_eq!(request.history.last(), Some(&ChatTurn::assistant("a4")));
    }

    #[test]
    fn customer_text_is_escaped_before_formatting() {
        let mut state = open_state();
        begin_submit(&mut state, SubmitSource::Panel, "<script>**x**</script>", 6).unwrap();
        let rendered = state.view.iter().find_map(|entry| match entry {
            ViewEntry::Message { role, html } if role == "user" => Some(html.clone()),
            _ => None,
        });
        assert_eq!(rendered.as_deref(), Some("&lt;script&gt;<strong>x</strong>&lt;/script&gt;"));
    }
}
