//! Tag balance: every non-void start tag must be closed, in nesting order.
//!
//! The html5ever tokenizer turns the page into [`TagEvent`]s which drive a
//! [`BalanceChecker`]. Mismatches are handled greedily: a wrong end tag still
//! pops the innermost open element and nothing is re-synchronised, so one
//! stray tag can cascade into several issues.

use html5ever::tendril::StrTendril;
use html5ever::tokenizer::states::RawKind;
use html5ever::tokenizer::{
    BufferQueue, TagKind, Token, TokenSink, TokenSinkResult, Tokenizer, TokenizerOpts,
};
use html5ever::TokenizerResult;
use std::cell::RefCell;
use std::panic::{self, AssertUnwindSafe};

pub const ISSUE_PARSE_FAILED: &str = "HTML parsing error (possibly malformed tags).";

const VOID_TAGS: [&str; 14] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

pub fn is_void(tag: &str) -> bool {
    VOID_TAGS.contains(&tag)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagEvent {
    Start(String),
    SelfClosing(String),
    End(String),
}

/// Stack of open non-void tags plus the issues found so far.
#[derive(Debug, Default)]
pub struct BalanceChecker {
    stack: Vec<String>,
    issues: Vec<String>,
}

impl BalanceChecker {
    pub fn handle(&mut self, event: TagEvent) {
        match event {
            TagEvent::Start(name) => {
                if !is_void(&name) {
                    self.stack.push(name);
                }
            }
            // Self-closing syntax never opens an element, void or not.
            TagEvent::SelfClosing(_) => {}
            TagEvent::End(name) => {
                if is_void(&name) {
                    return;
                }
                match self.stack.pop() {
                    None => self
                        .issues
                        .push(format!("Unexpected closing tag </{name}>.")),
                    Some(expected) if expected != name => self.issues.push(format!(
                        "Mismatched closing tag </{name}> (expected </{expected}>)."
                    )),
                    Some(_) => {}
                }
            }
        }
    }

    pub fn record_parse_failure(&mut self) {
        self.issues.push(ISSUE_PARSE_FAILED.to_string());
    }

    pub fn open_tags(&self) -> &[String] {
        &self.stack
    }

    /// Drain the stack, innermost tag first, and return every issue.
    pub fn finish(mut self) -> Vec<String> {
        while let Some(tag) = self.stack.pop() {
            self.issues.push(format!("Unclosed tag <{tag}>."));
        }
        self.issues
    }
}

struct EventSink<'a> {
    checker: &'a RefCell<BalanceChecker>,
}

impl TokenSink for EventSink<'_> {
    type Handle = ();

    fn process_token(&self, token: Token, line_number: u64) -> TokenSinkResult<()> {
        match token {
            Token::TagToken(tag) => {
                let name = tag.name.to_string();
                let event = match tag.kind {
                    TagKind::StartTag if tag.self_closing => TagEvent::SelfClosing(name),
                    TagKind::StartTag => TagEvent::Start(name),
                    TagKind::EndTag => TagEvent::End(name),
                };
                // Script and style bodies are opaque text up to their end tag.
                let raw = match &event {
                    TagEvent::Start(n) if n == "script" => Some(RawKind::ScriptData),
                    TagEvent::Start(n) if n == "style" => Some(RawKind::Rawtext),
                    _ => None,
                };
                self.checker.borrow_mut().handle(event);
                if let Some(kind) = raw {
                    return TokenSinkResult::RawData(kind);
                }
            }
            Token::ParseError(err) => {
                tracing::debug!(line = line_number, "recoverable html syntax error: {err}");
            }
            _ => {}
        }
        TokenSinkResult::Continue
    }
}

/// Run `drive` against a fresh checker. A panic inside `drive` is contained
/// here and reported as one parse-failure issue; the open tags reached so far
/// are still reported as unclosed.
///
/// The process panic hook still runs, so the panic message also reaches
/// stderr; the warning below ties it to the issue it became.
fn collect_issues<F>(drive: F) -> Vec<String>
where
    F: FnOnce(&RefCell<BalanceChecker>),
{
    let checker = RefCell::new(BalanceChecker::default());
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| drive(&checker)));
    let mut checker = checker.into_inner();
    if let Err(payload) = outcome {
        let reason = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        tracing::warn!(%reason, "html tokenizer panicked; reporting a parse error");
        checker.record_parse_failure();
    }
    checker.finish()
}

pub fn check_tag_balance(content: &str) -> Vec<String> {
    collect_issues(|checker| {
        let tokenizer = Tokenizer::new(EventSink { checker }, TokenizerOpts::default());
        let input = BufferQueue::default();
        input.push_back(StrTendril::from_slice(content));
        // The sink never asks for script execution, but a paused tokenizer
        // must be resumed until the whole buffer is consumed.
        loop {
            match tokenizer.feed(&input) {
                TokenizerResult::Done => break,
                TokenizerResult::Script(()) => continue,
            }
        }
        tokenizer.end();
    })
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    const CONTAINER_TAGS: [&str; 10] = [
        "div", "span", "p", "ul", "li", "section", "a", "em", "table", "td",
    ];

    #[derive(Debug, Clone)]
    enum Node {
        Element(String, Vec<Node>),
        Void {
            name: String,
            closed: bool,
            self_closing: bool,
        },
        Text(String),
    }

    fn render(node: &Node, out: &mut String) {
        match node {
            Node::Element(name, children) => {
                out.push_str(&format!("<{name}>"));
                for child in children {
                    render(child, out);
                }
                out.push_str(&format!("</{name}>"));
            }
            Node::Void {
                name,
                closed,
                self_closing,
            } => {
                if *self_closing {
                    out.push_str(&format!("<{name}/>"));
                } else {
                    out.push_str(&format!("<{name}>"));
                }
                if *closed {
                    out.push_str(&format!("</{name}>"));
                }
            }
            Node::Text(text) => out.push_str(text),
        }
    }

    fn node() -> impl Strategy<Value = Node> {
        let leaf = prop_oneof![
            (
                prop::sample::select(VOID_TAGS.to_vec()),
                any::<bool>(),
                any::<bool>()
            )
                .prop_map(|(name, closed, self_closing)| Node::Void {
                    name: name.to_string(),
                    closed,
                    self_closing,
                }),
            "[a-z ]{0,8}".prop_map(Node::Text),
        ];
        leaf.prop_recursive(4, 48, 5, |inner| {
            (
                prop::sample::select(CONTAINER_TAGS.to_vec()),
                prop::collection::vec(inner, 0..5),
            )
                .prop_map(|(name, children)| Node::Element(name.to_string(), children))
        })
    }

    fn event() -> impl Strategy<Value = TagEvent> {
        let names: Vec<&str> = CONTAINER_TAGS.iter().chain(VOID_TAGS.iter()).copied().collect();
        (prop::sample::select(names), 0u8..3).prop_map(|(name, kind)| {
            let name = name.to_string();
            match kind {
                0 => TagEvent::Start(name),
                1 => TagEvent::SelfClosing(name),
                _ => TagEvent::End(name),
            }
        })
    }

    proptest! {
        /// Well-nested non-void trees, with void tags in any spelling mixed in, are clean.
        #[test]
        fn nested_documents_are_balanced(roots in prop::collection::vec(node(), 0..4)) {
            let mut html = String::new();
            for root in &roots {
                render(root, &mut html);
            }
            prop_assert!(check_tag_balance(&html).is_empty(), "{}", html);
        }

        /// The open-tag stack never holds a void name, whatever the event order.
        #[test]
        fn stack_excludes_void_tags(events in prop::collection::vec(event(), 0..64)) {
            let mut checker = BalanceChecker::default();
            for ev in events {
                checker.handle(ev);
                prop_assert!(checker.open_tags().iter().all(|t| !is_void(t)));
            }
        }

        /// Void end tags change neither the stack nor the issues.
        #[test]
        fn void_end_tags_are_inert(
            events in prop::collection::vec(event(), 0..48),
            voids in prop::collection::vec(
                (0usize..48, prop::sample::select(VOID_TAGS.to_vec())),
                0..16,
            ),
        ) {
            let mut plain = BalanceChecker::default();
            for ev in events.clone() {
                plain.handle(ev);
            }

            let mut mixed = BalanceChecker::default();
            for (i, ev) in events.into_iter().enumerate() {
                for (_, name) in voids.iter().filter(|(at, _)| *at == i) {
                    mixed.handle(TagEvent::End(name.to_string()));
                }
                mixed.handle(ev);
            }

            prop_assert_eq!(plain.open_tags(), mixed.open_tags());
            prop_assert_eq!(plain.finish(), mixed.finish());
        }
    }
}
