//! Indented text dump of query and filter graphs.
//!
//! One line per node, two spaces per nesting level. Wraps are printed inline:
//! `token p=NN`, `span c=vp attr (class:header | id:7)`.

use std::fmt::{self, Write};

use crate::node::{
    Boundary, Distance, Doc, Filter, Node, Operation, Reference, Term, TermGroup, Wrap,
};
use crate::vocab::{ClassRefOp, MatchOperator, ValueType};

enum Root<'a> {
    Query(&'a Node),
    Filter(&'a Filter),
}

pub struct GraphPrinter<'a> {
    root: Root<'a>,
    indent: usize,
}

impl<'a> GraphPrinter<'a> {
    pub fn new(node: &'a Node) -> Self {
        Self {
            root: Root::Query(node),
            indent: 2,
        }
    }

    pub fn filter(filter: &'a Filter) -> Self {
        Self {
            root: Root::Filter(filter),
            indent: 2,
        }
    }

    pub fn indent(mut self, width: usize) -> Self {
        self.indent = width;
        self
    }

    pub fn dump(&self) -> String {
        let mut out = String::new();
        self.format(&mut out).expect("String write never fails");
        out
    }

    pub fn format(&self, w: &mut impl Write) -> fmt::Result {
        match self.root {
            Root::Query(node) => self.format_node(node, 0, w),
            Root::Filter(filter) => self.format_filter(filter, 0, w),
        }
    }

    fn prefix(&self, depth: usize) -> String {
        " ".repeat(depth * self.indent)
    }

    fn format_node(&self, node: &Node, depth: usize, w: &mut impl Write) -> fmt::Result {
        let prefix = self.prefix(depth);
        match node {
            Node::Token(token) => match &token.wrap {
                Some(wrap) => writeln!(w, "{prefix}token {wrap}"),
                None => writeln!(w, "{prefix}token"),
            },
            Node::Span(span) => {
                write!(w, "{prefix}span")?;
                if let Some(wrap) = &span.wrap {
                    write!(w, " {wrap}")?;
                }
                if let Some(attr) = &span.attr {
                    write!(w, " attr {attr}")?;
                }
                writeln!(w)
            }
            Node::Term(term) => writeln!(w, "{prefix}{term}"),
            Node::TermGroup(group) => writeln!(w, "{prefix}{group}"),
            Node::Group(group) => {
                write!(w, "{prefix}{}", group.operation.name())?;
                format_operation(&group.operation, w)?;
                writeln!(w)?;
                for operand in &group.operands {
                    self.format_node(operand, depth + 1, w)?;
                }
                Ok(())
            }
            Node::Reference(reference) => {
                writeln!(w, "{prefix}{}", ReferenceHeader(reference))?;
                for operand in &reference.operands {
                    self.format_node(operand, depth + 1, w)?;
                }
                Ok(())
            }
        }
    }

    fn format_filter(&self, filter: &Filter, depth: usize, w: &mut impl Write) -> fmt::Result {
        let prefix = self.prefix(depth);
        match filter {
            Filter::Doc(doc) => writeln!(w, "{prefix}doc {doc}"),
            Filter::Ref(name) => writeln!(w, "{prefix}ref {name}"),
            Filter::Group(group) => {
                writeln!(w, "{prefix}{}", group.op.as_str())?;
                for operand in &group.operands {
                    self.format_filter(operand, depth + 1, w)?;
                }
                Ok(())
            }
        }
    }
}

fn format_operation(operation: &Operation, w: &mut impl Write) -> fmt::Result {
    match operation {
        Operation::Sequence {
            distances,
            in_order,
        } => {
            for distance in distances {
                write!(w, " {distance}")?;
            }
            if !in_order {
                write!(w, " unordered")?;
            }
            Ok(())
        }
        Operation::Disjunction => Ok(()),
        Operation::Relation(relation) => {
            if let Some(term) = &relation.wrap {
                write!(w, " {term}")?;
            }
            if let Some(boundary) = relation.boundary {
                write!(w, " {boundary}")?;
            }
            Ok(())
        }
        Operation::Position { frames, exclude } => {
            let names: Vec<_> = frames.iter().map(|f| f.as_str()).collect();
            write!(w, " {}", names.join(","))?;
            if *exclude {
                write!(w, " exclude")?;
            }
            Ok(())
        }
        Operation::Class(n) => write!(w, " {n}"),
        Operation::Repetition(boundary) => write!(w, " {boundary}"),
    }
}

struct ReferenceHeader<'a>(&'a Reference);

impl fmt::Display for ReferenceHeader<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reference = self.0;
        f.write_str(reference.operation.as_str())?;
        if !reference.class_refs.is_empty() {
            let sep = match reference.class_ref_op {
                Some(ClassRefOp::Intersection) => "|",
                None => ",",
            };
            let refs: Vec<_> = reference.class_refs.iter().map(u32::to_string).collect();
            write!(f, " {}", refs.join(sep))?;
        }
        if let Some(span_ref) = reference.span_ref {
            match span_ref.length {
                Some(length) => write!(f, " span[{},{}]", span_ref.start, length)?,
                None => write!(f, " span[{}]", span_ref.start)?,
            }
        }
        Ok(())
    }
}

fn type_suffix(value_type: ValueType) -> &'static str {
    match value_type {
        ValueType::String | ValueType::Regex => "",
        ValueType::Date => "::date",
        ValueType::Integer => "::integer",
        ValueType::Punct => "::punct",
        ValueType::Wildcard => "::wildcard",
    }
}

fn write_literal(f: &mut fmt::Formatter<'_>, text: &str, value_type: ValueType) -> fmt::Result {
    match value_type {
        ValueType::Regex => write!(f, "/{text}/"),
        _ => f.write_str(text),
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(foundry) = &self.foundry {
            write!(f, "{foundry}/")?;
        }
        let qualified = self.layer.is_some() || self.foundry.is_some();
        if let Some(layer) = &self.layer {
            f.write_str(layer)?;
        }
        if self.has_key() {
            if qualified || self.match_op != MatchOperator::Eq {
                f.write_str(self.match_op.symbol())?;
            }
            write_literal(f, &self.key, self.value_type)?;
            if let Some(value) = &self.value {
                f.write_char(':')?;
                write_literal(f, value, self.value_type)?;
            }
        }
        f.write_str(type_suffix(self.value_type))?;
        if !self.flags.is_empty() {
            f.write_char('[')?;
            if self.flags.case_insensitive {
                f.write_char('i')?;
            }
            if self.flags.diacritics_insensitive {
                f.write_char('d')?;
            }
            f.write_char(']')?;
        }
        Ok(())
    }
}

impl fmt::Display for Wrap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Wrap::Term(term) => term.fmt(f),
            Wrap::Group(group) => group.fmt(f),
        }
    }
}

impl fmt::Display for TermGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char('(')?;
        for (i, operand) in self.operands.iter().enumerate() {
            if i > 0 {
                write!(f, " {} ", self.op.symbol())?;
            }
            operand.fmt(f)?;
        }
        f.write_char(')')
    }
}

impl fmt::Display for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max() {
            Some(max) => write!(f, "{{{},{}}}", self.min(), max),
            None => write!(f, "{{{},}}", self.min()),
        }
    }
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.exclude {
            f.write_char('!')?;
        }
        write!(f, "{}{}", self.key, self.boundary)
    }
}

impl fmt::Display for Doc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.key, self.match_op.symbol())?;
        write_literal(f, &self.value, self.value_type)?;
        f.write_str(type_suffix(self.value_type))
    }
}
