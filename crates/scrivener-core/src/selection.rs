//! Selection context: the ancestor chain of the selection's focus node.
//!
//! The chain is computed by a pure walk from the anchor up to (excluding) the
//! editor root and is consumed read-only by the toolbar classifiers.

use smol_str::SmolStr;

/// Classification-relevant view of one node in the ancestor chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeInfo {
    /// Upper-case node name as the DOM reports it (`"P"`, `"A"`, `"#text"`).
    pub node_name: SmolStr,
    /// Full `class` attribute, None for non-elements.
    pub class_name: Option<SmolStr>,
}

impl NodeInfo {
    /// An element with no class attribute.
    pub fn element(tag: &str) -> Self {
        Self {
            node_name: SmolStr::new(tag.to_ascii_uppercase()),
            class_name: Some(SmolStr::default()),
        }
    }

    /// An element carrying the given class attribute.
    pub fn element_with_class(tag: &str, class_name: &str) -> Self {
        Self {
            node_name: SmolStr::new(tag.to_ascii_uppercase()),
            class_name: Some(SmolStr::new(class_name)),
        }
    }

    pub fn text() -> Self {
        Self {
            node_name: SmolStr::new_static("#text"),
            class_name: None,
        }
    }

    pub fn is_element(&self) -> bool {
        self.class_name.is_some()
    }

    pub fn is_anchor(&self) -> bool {
        self.node_name == "A"
    }

    /// Exact match against the element's class attribute.
    pub fn has_class_attribute(&self, class: &str) -> bool {
        self.class_name.as_deref() == Some(class)
    }
}

/// Ordered ancestors of the selection, outer to inner.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectionContext {
    pub ancestors: Vec<NodeInfo>,
    /// Whether any ancestor is an anchor element.
    pub link_selected: bool,
}

impl SelectionContext {
    pub fn new(ancestors: Vec<NodeInfo>) -> Self {
        let link_selected = ancestors.iter().any(NodeInfo::is_anchor);
        Self {
            ancestors,
            link_selected,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &NodeInfo> {
        self.ancestors.iter()
    }

    /// First ancestor, scanning outer to inner, that satisfies `pred`.
    pub fn find(&self, pred: impl Fn(&NodeInfo) -> bool) -> Option<&NodeInfo> {
        self.ancestors.iter().find(|node| pred(node))
    }
}

/// A node that can be walked towards the document root.
pub trait AncestorNode: Sized {
    fn parent(&self) -> Option<Self>;

    fn info(&self) -> NodeInfo;
}

/// Collect the chain from `anchor` up to, but excluding, the first node for
/// which `is_root` holds.
///
/// Returns None if the walk runs off the top of the tree without meeting
/// the root, i.e. the selection is outside the editor.
pub fn ancestor_chain<N: AncestorNode>(
    anchor: N,
    is_root: impl Fn(&N) -> bool,
) -> Option<SelectionContext> {
    let mut ancestors = Vec::new();
    let mut current = Some(anchor);

    while let Some(node) = current {
        if is_root(&node) {
            ancestors.reverse();
            return Some(SelectionContext::new(ancestors));
        }
        ancestors.push(node.info());
        current = node.parent();
    }

    tracing::trace!(
        target: "scrivener::selection",
        depth = ancestors.len(),
        "selection anchor is outside the editor root"
    );
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Parent-indexed tree for walking tests.
    struct Tree {
        nodes: Vec<(NodeInfo, Option<usize>, &'static str)>,
    }

    #[derive(Clone, Copy)]
    struct Handle<'a> {
        tree: &'a Tree,
        idx: usize,
    }

    impl AncestorNode for Handle<'_> {
        fn parent(&self) -> Option<Self> {
            self.tree.nodes[self.idx].1.map(|idx| Handle {
                tree: self.tree,
                idx,
            })
        }

        fn info(&self) -> NodeInfo {
            self.tree.nodes[self.idx].0.clone()
        }
    }

    fn tree() -> Tree {
        Tree {
            nodes: vec![
                (NodeInfo::element("body"), None, ""),
                (NodeInfo::element("div"), Some(0), "editor"),
                (NodeInfo::element_with_class("div", "custom"), Some(1), ""),
                (NodeInfo::element("p"), Some(2), ""),
                (NodeInfo::element("a"), Some(3), ""),
                (NodeInfo::text(), Some(4), ""),
                (NodeInfo::element("aside"), Some(0), ""),
            ],
        }
    }

    #[test]
    fn test_chain_is_outer_to_inner_and_excludes_root() {
        let tree = tree();
        let ctx = ancestor_chain(Handle { tree: &tree, idx: 5 }, |h| {
            tree.nodes[h.idx].2 == "editor"
        })
        .unwrap();

        let names: Vec<_> = ctx.iter().map(|n| n.node_name.as_str()).collect();
        assert_eq!(names, ["DIV", "P", "A", "#text"]);
        assert!(ctx.link_selected);
    }

    #[test]
    fn test_anchor_outside_root() {
        let tree = tree();
        let ctx = ancestor_chain(Handle { tree: &tree, idx: 6 }, |h| {
            tree.nodes[h.idx].2 == "editor"
        });
        assert!(ctx.is_none());
    }

    #[test]
    fn test_anchor_is_root() {
        let tree = tree();
        let ctx = ancestor_chain(Handle { tree: &tree, idx: 1 }, |h| {
            tree.nodes[h.idx].2 == "editor"
        })
        .unwrap();
        assert!(ctx.ancestors.is_empty());
        assert!(!ctx.link_selected);
    }

    #[test]
    fn test_class_match_is_exact() {
        let node = NodeInfo::element_with_class("div", "custom wide");
        assert!(!node.has_class_attribute("custom"));
        assert!(node.has_class_attribute("custom wide"));
        assert!(!NodeInfo::text().has_class_attribute(""));
    }
}
