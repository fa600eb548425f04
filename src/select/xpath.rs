//! XPath evaluation over the parsed HTML tree
//!
//! scraper has no XPath engine, so the tree is mirrored into an
//! sxd-document (without namespaces, so `//table` matches HTML tables) and
//! matched elements are mapped back to the scraper elements they came from.

use std::collections::HashMap;
use std::fmt;

use scraper::{ElementRef, Node};
use sxd_document::{dom, Package};
use sxd_xpath::nodeset::Node as XNode;
use sxd_xpath::{Context, ExecutionError, Factory, Value, XPath};
use tracing::trace;

use crate::document::Document;

/// A compiled XPath expression
pub struct XPathQuery {
    expr: String,
    xpath: XPath,
}

impl fmt::Debug for XPathQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("XPathQuery").field(&self.expr).finish()
    }
}

/// Why an expression could not be compiled
#[derive(Debug)]
pub enum CompileError {
    Syntax(sxd_xpath::Error),
    /// Nothing but whitespace
    Empty,
}

/// Why an XPath expression produced no usable element list
#[derive(Debug)]
pub enum XPathFailure {
    /// Unknown function, wrong argument types, etc.
    Execution(ExecutionError),
    /// The node-set contains text, attribute or other non-element nodes
    NonElement,
}

impl XPathQuery {
    /// Compile `expr`, failing on invalid syntax
    pub fn compile(expr: &str) -> Result<Self, CompileError> {
        let xpath = Factory::new()
            .build(expr)
            .map_err(|e| CompileError::Syntax(e.into()))?
            .ok_or(CompileError::Empty)?;
        Ok(XPathQuery {
            expr: expr.to_string(),
            xpath,
        })
    }

    pub fn expr(&self) -> &str {
        &self.expr
    }

    /// Evaluate against the document, with the `html` element as context node
    ///
    /// Results come back in document order. A result that is not a node-set
    /// (a number, string or boolean) selects nothing.
    pub fn evaluate<'a>(&self, document: &'a Document) -> Result<Vec<ElementRef<'a>>, XPathFailure> {
        let package = Package::new();
        let mirror = package.as_document();
        let root = document.root_element();

        let mut elements = HashMap::new();
        let context_node = mirror_tree(&mirror, root, &mut elements);
        mirror.root().append_child(context_node);
        trace!(elements = elements.len(), "mirrored tree for xpath");

        let context = Context::new();
        let value = self
            .xpath
            .evaluate(&context, context_node)
            .map_err(XPathFailure::Execution)?;

        let nodes = match value {
            Value::Nodeset(nodes) => nodes.document_order(),
            _ => return Ok(Vec::new()),
        };

        nodes
            .into_iter()
            .map(|node| match node {
                XNode::Element(element) => {
                    elements.get(&element).copied().ok_or(XPathFailure::NonElement)
                }
                _ => Err(XPathFailure::NonElement),
            })
            .collect()
    }
}

/// Copy `root` and everything below it into `mirror`
///
/// Returns the copy of `root`, not yet attached. Every copied element is
/// recorded against the element it was copied from.
fn mirror_tree<'a, 'd>(
    mirror: &dom::Document<'d>,
    root: ElementRef<'a>,
    elements: &mut HashMap<dom::Element<'d>, ElementRef<'a>>,
) -> dom::Element<'d> {
    let mirrored_root = mirror_element(mirror, root);
    elements.insert(mirrored_root, root);

    let mut pending = vec![(root, mirrored_root)];
    while let Some((source, target)) = pending.pop() {
        for child in source.children() {
            match child.value() {
                Node::Element(_) => {
                    if let Some(child_element) = ElementRef::wrap(child) {
                        let copy = mirror_element(mirror, child_element);
                        target.append_child(copy);
                        elements.insert(copy, child_element);
                        pending.push((child_element, copy));
                    }
                }
                Node::Text(text) => target.append_child(mirror.create_text(text)),
                Node::Comment(comment) => target.append_child(mirror.create_comment(comment)),
                _ => {}
            }
        }
    }

    mirrored_root
}

fn mirror_element<'d>(mirror: &dom::Document<'d>, source: ElementRef<'_>) -> dom::Element<'d> {
    let element = mirror.create_element(source.value().name());
    for (name, value) in source.value().attrs() {
        element.set_attribute_value(name, value);
    }
    element
}
