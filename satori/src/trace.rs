//! Depth-indented diagnostic traces.
//!
//! Every engine can narrate its run through a [`Tracer`]. Messages carry the
//! recursion depth at which they were produced; the sink buffers them in
//! memory so a slow consumer never blocks the engine. After a run completes
//! the buffered events are rendered into one of three line-oriented string
//! formats.
//!
//! The sink is a capability trait rather than a formatting mode so tests can
//! assert on structured events instead of scraping strings.

use std::fmt;

use crate::{
    cnf::VarNames,
    lit::Lit,
};

/// Receives trace messages as they are produced.
pub trait TraceSink {
    /// Records one message produced at the given recursion depth.
    fn event(&mut self, depth: usize, message: &str);
}

/// A single buffered trace message.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct TraceEvent {
    /// Recursion depth at which the message was produced.
    pub depth: usize,
    /// The message text.
    pub message: String,
}

/// The default sink: an in-memory event buffer.
#[derive(Default)]
pub struct TraceBuffer {
    /// The buffered events, in production order.
    pub events: Vec<TraceEvent>,
}

impl TraceSink for TraceBuffer {
    fn event(&mut self, depth: usize, message: &str) {
        self.events.push(TraceEvent {
            depth,
            message: message.to_owned(),
        });
    }
}

/// Literal rendering applied when a buffered trace is turned into a string.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum TraceStyle {
    /// Two-space indentation, newline terminated.
    Plain,
    /// `&nbsp;` indentation, `<br>` terminated, `&`/`<`/`>` escaped.
    Html,
    /// Dimmed indentation guides for terminals.
    Console,
}

impl TraceBuffer {
    /// Renders the buffered events as one string.
    pub fn render(&self, style: TraceStyle) -> String {
        let mut out = String::new();
        for event in &self.events {
            match style {
                TraceStyle::Plain => {
                    for _ in 0..event.depth {
                        out.push_str("  ");
                    }
                    out.push_str(&event.message);
                    out.push('\n');
                }
                TraceStyle::Html => {
                    for _ in 0..event.depth {
                        out.push_str("&nbsp;&nbsp;");
                    }
                    out.push_str(&escape_html(&event.message));
                    out.push_str("<br>\n");
                }
                TraceStyle::Console => {
                    if event.depth > 0 {
                        out.push_str("\x1b[2m");
                        for _ in 0..event.depth {
                            out.push_str("| ");
                        }
                        out.push_str("\x1b[0m");
                    }
                    out.push_str(&event.message);
                    out.push('\n');
                }
            }
        }
        out
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Handle through which an engine narrates one run.
///
/// Holds the sink (if tracing is enabled at all) and the optional
/// variable-name table used to render literals.
#[derive(Default)]
pub struct Tracer<'a> {
    sink: Option<&'a mut dyn TraceSink>,
    names: Option<&'a VarNames>,
}

impl<'a> Tracer<'a> {
    /// A tracer that drops every message.
    pub fn off() -> Tracer<'a> {
        Tracer::default()
    }

    /// A tracer writing to the given sink, rendering literals numerically.
    pub fn new(sink: &'a mut dyn TraceSink) -> Tracer<'a> {
        Tracer {
            sink: Some(sink),
            names: None,
        }
    }

    /// A tracer writing to the given sink, rendering literals by name where
    /// the table covers them.
    pub fn with_names(sink: &'a mut dyn TraceSink, names: &'a VarNames) -> Tracer<'a> {
        Tracer {
            sink: Some(sink),
            names: Some(names),
        }
    }

    /// Whether messages are recorded at all.
    ///
    /// Callers use this to skip message formatting entirely for untraced
    /// runs; the [`note!`](crate::note!) macro does so automatically.
    #[inline]
    pub fn active(&self) -> bool {
        self.sink.is_some()
    }

    /// Records one message at the given depth.
    pub fn event(&mut self, depth: usize, args: fmt::Arguments) {
        if let Some(sink) = &mut self.sink {
            sink.event(depth, &args.to_string());
        }
    }

    /// Renders a literal, by name when the name table covers its variable.
    pub fn lit(&self, lit: Lit) -> String {
        match self.names.and_then(|names| names.get(lit.var())) {
            Some(name) if lit.is_positive() => name.to_owned(),
            Some(name) => format!("-{name}"),
            None => lit.to_string(),
        }
    }

    /// Renders a clause as `{l1, l2, …}`.
    pub fn clause(&self, lits: &[Lit]) -> String {
        let mut out = String::from("{");
        for (i, &lit) in lits.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            out.push_str(&self.lit(lit));
        }
        out.push('}');
        out
    }
}

/// Records a trace message, skipping all formatting when tracing is off.
#[macro_export]
macro_rules! note {
    ($tracer:expr, $depth:expr, $($args:tt)*) => {
        if $tracer.active() {
            $tracer.event($depth, format_args!($($args)*));
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_keep_depth_and_order() {
        let mut buffer = TraceBuffer::default();
        let mut tracer = Tracer::new(&mut buffer);
        note!(tracer, 0, "start");
        note!(tracer, 2, "inner {}", 42);
        assert_eq!(
            buffer.events,
            vec![
                TraceEvent {
                    depth: 0,
                    message: "start".to_owned()
                },
                TraceEvent {
                    depth: 2,
                    message: "inner 42".to_owned()
                },
            ]
        );
    }

    #[test]
    fn plain_rendering_indents_by_depth() {
        let mut buffer = TraceBuffer::default();
        buffer.event(0, "a");
        buffer.event(1, "b");
        assert_eq!(buffer.render(TraceStyle::Plain), "a\n  b\n");
    }

    #[test]
    fn html_rendering_escapes_markup() {
        let mut buffer = TraceBuffer::default();
        buffer.event(1, "x < y");
        assert_eq!(
            buffer.render(TraceStyle::Html),
            "&nbsp;&nbsp;x &lt; y<br>\n"
        );
    }

    #[test]
    fn names_apply_when_table_covers_the_variable() {
        let names = VarNames::from_names(["rain"]);
        let mut buffer = TraceBuffer::default();
        let tracer = Tracer::with_names(&mut buffer, &names);
        assert_eq!(tracer.lit(Lit::from_signed(1)), "rain");
        assert_eq!(tracer.lit(Lit::from_signed(-1)), "-rain");
        assert_eq!(tracer.lit(Lit::from_signed(2)), "2");
        assert_eq!(
            tracer.clause(&[Lit::from_signed(-1), Lit::from_signed(2)]),
            "{-rain, 2}"
        );
    }
}
