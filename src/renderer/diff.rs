//! Reconciler - patches a live subtree from an old virtual tree to a new one.
//!
//! # Algorithm
//!
//! First matching rule wins:
//!
//! 1. No display node: nothing to patch
//! 2. New is `Empty`: remove the node
//! 3. Old is `Empty`: materialize new, replace in place
//! 4. Text involved: both text → update content if changed, else replace
//! 5. Element tag changed: materialize new, replace (subtree state is dropped)
//! 6. Same tag: update attributes, handler slots and children in place
//!
//! Children are matched by position only. Reordering a list rewrites each
//! position instead of moving nodes.

use log::{trace, warn};
use smallvec::SmallVec;

use super::patch::Patcher;
use crate::engine::NodeId;
use crate::error::DomError;
use crate::types::{AttrKind, Attrs, Element, VNode};

impl Patcher<'_> {
    /// Bring `node` (produced from `old`) in line with `new`.
    pub fn reconcile(&mut self, node: Option<NodeId>, new: &VNode, old: &VNode) -> Result<(), DomError> {
        let Some(node) = node else {
            return Ok(());
        };

        match (new, old) {
            (VNode::Empty, _) => {
                trace!("remove {node:?}");
                self.doc.remove(node)
            }
            (_, VNode::Empty) => self.replace(node, new),
            (VNode::Text(new_text), VNode::Text(old_text)) => {
                if new_text != old_text {
                    trace!("text {node:?}: {old_text:?} -> {new_text:?}");
                    self.doc.set_text(node, new_text)?;
                }
                Ok(())
            }
            (VNode::Text(_), _) | (_, VNode::Text(_)) => self.replace(node, new),
            (VNode::Element(new_el), VNode::Element(old_el)) if new_el.tag != old_el.tag => {
                self.replace(node, new)
            }
            (VNode::Element(new_el), VNode::Element(old_el)) => {
                self.update_element(node, new_el, old_el)
            }
        }
    }

    fn replace(&mut self, node: NodeId, new: &VNode) -> Result<(), DomError> {
        let fresh = self.materialize(new)?;
        trace!("replace {node:?} with {fresh:?}");
        self.doc.replace_child(node, fresh)
    }

    fn update_element(&mut self, node: NodeId, new: &Element, old: &Element) -> Result<(), DomError> {
        if let Some(name) = &new.node_ref {
            self.refs.record(name, node);
        }
        self.update_attrs(node, &new.attrs, &old.attrs)?;
        self.update_children(node, new, old)
    }

    // =========================================================================
    // Attributes
    // =========================================================================

    fn update_attrs(&mut self, node: NodeId, new: &Attrs, old: &Attrs) -> Result<(), DomError> {
        // Event names still bound by some new key, so that renaming
        // `onClick` to `onclick` does not drop the slot.
        let mut live_events: SmallVec<[String; 4]> = SmallVec::new();

        for (key, value) in new {
            match AttrKind::classify(key) {
                AttrKind::Event(event) => {
                    match value.as_handler() {
                        // Always overwritten: handlers close over fresh state
                        Some(handler) => self.doc.set_handler(node, &event, handler.clone())?,
                        None => {
                            warn!("ignoring non-handler value for event attribute `{key}`");
                            self.doc.remove_handler(node, &event)?;
                        }
                    }
                    live_events.push(event);
                }
                AttrKind::Property(prop) => self.doc.set_property(node, prop, value.is_truthy())?,
                AttrKind::Plain => {
                    let Some(text) = value.as_attribute() else {
                        warn!("ignoring handler value for plain attribute `{key}`");
                        self.doc.remove_attribute(node, key)?;
                        continue;
                    };
                    let previous = old.get(key).and_then(|v| v.as_attribute());
                    if previous.as_deref() != Some(text.as_str()) {
                        self.doc.set_attribute(node, key, &text)?;
                    }
                }
            }
        }

        for key in old.keys().filter(|key| !new.contains_key(*key)) {
            match AttrKind::classify(key) {
                AttrKind::Event(event) => {
                    if !live_events.contains(&event) {
                        self.doc.remove_handler(node, &event)?;
                    }
                }
                AttrKind::Property(prop) => self.doc.set_property(node, prop, false)?,
                AttrKind::Plain => self.doc.remove_attribute(node, key)?,
            }
        }
        Ok(())
    }

    // =========================================================================
    // Children
    // =========================================================================

    fn update_children(&mut self, node: NodeId, new: &Element, old: &Element) -> Result<(), DomError> {
        let new_children: SmallVec<[&VNode; 8]> = new.rendered_children().collect();
        let old_children: SmallVec<[&VNode; 8]> = old.rendered_children().collect();
        let (new_len, old_len) = (new_children.len(), old_children.len());

        for index in 0..new_len.min(old_len) {
            let child = self.doc.children(node).get(index).copied();
            self.reconcile(child, new_children[index], old_children[index])?;
        }

        if new_len > old_len {
            for vnode in &new_children[old_len..] {
                let child = self.materialize(vnode)?;
                self.doc.append_child(node, child)?;
            }
        }

        // From the end so earlier indices stay put
        if old_len > new_len {
            for index in (new_len..old_len).rev() {
                if let Some(child) = self.doc.children(node).get(index).copied() {
                    self.doc.remove(child)?;
                }
            }
        }
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use super::*;
    use crate::engine::{Document, Mutation};
    use crate::renderer::NodeRefs;
    use crate::types::{AttrValue, BoolProp, Event};

    struct Fixture {
        doc: Document,
        refs: NodeRefs,
        root: NodeId,
    }

    fn setup() -> Fixture {
        let mut doc = Document::with_journal();
        let root = doc.create_element("main").unwrap();
        doc.take_mutations();
        Fixture {
            doc,
            refs: NodeRefs::new(),
            root,
        }
    }

    impl Fixture {
        fn mount(&mut self, vnode: &VNode) -> NodeId {
            let node = Patcher::new(&mut self.doc, &mut self.refs).materialize(vnode).unwrap();
            self.doc.append_child(self.root, node).unwrap();
            self.doc.take_mutations();
            node
        }

        fn patch(&mut self, new: &VNode, old: &VNode) -> Vec<Mutation> {
            let node = self.doc.first_child(self.root);
            Patcher::new(&mut self.doc, &mut self.refs)
                .reconcile(node, new, old)
                .unwrap();
            self.doc.take_mutations()
        }

        fn current(&self) -> NodeId {
            self.doc.first_child(self.root).unwrap()
        }

        fn html(&self) -> String {
            self.doc.to_html(self.current())
        }
    }

    fn list(items: &[&str]) -> VNode {
        Element::new("ul")
            .children(items.iter().map(|item| Element::new("li").child(*item)))
            .into()
    }

    #[test]
    fn test_absent_node_is_noop() {
        let mut fx = setup();
        Patcher::new(&mut fx.doc, &mut fx.refs)
            .reconcile(None, &VNode::from("a"), &VNode::Empty)
            .unwrap();
        assert!(fx.doc.mutations().is_empty());
    }

    #[test]
    fn test_identical_tree_is_idempotent() {
        let mut fx = setup();
        let vnode: VNode = Element::new("form")
            .attr("class", "app")
            .attr("checked", true)
            .on("submit", |_| {})
            .child(Element::new("input").attr("disabled", false).attr("value", "x"))
            .child("text")
            .child(VNode::Empty)
            .into();
        fx.mount(&vnode);

        let copy = vnode.clone();
        let mutations = fx.patch(&copy, &vnode);
        assert!(mutations.is_empty(), "unexpected writes: {mutations:?}");
        assert!(!mutations.iter().any(Mutation::is_handler_change));
    }

    #[test]
    fn test_round_trip_matches_fresh_materialize() {
        let mut fx = setup();
        let vnode = list(&["a", "b", "c"]);
        fx.mount(&vnode);
        fx.patch(&vnode, &vnode);

        let mut other = Document::new();
        let mut refs = NodeRefs::new();
        let fresh = Patcher::new(&mut other, &mut refs).materialize(&vnode).unwrap();
        assert_eq!(fx.html(), other.to_html(fresh));
    }

    #[test]
    fn test_new_empty_removes_node() {
        let mut fx = setup();
        let old = list(&["a"]);
        let node = fx.mount(&old);
        fx.patch(&VNode::Empty, &old);
        assert!(fx.doc.children(fx.root).is_empty());
        assert!(!fx.doc.contains(node));
    }

    #[test]
    fn test_old_empty_replaces_placeholder() {
        let mut fx = setup();
        let placeholder = fx.mount(&VNode::Empty);
        let new: VNode = Element::new("p").child("hi").into();
        fx.patch(&new, &VNode::Empty);
        assert_ne!(fx.current(), placeholder);
        assert_eq!(fx.html(), "<p>hi</p>");
    }

    #[test]
    fn test_text_updated_in_place() {
        let mut fx = setup();
        let node = fx.mount(&VNode::from("a"));
        let mutations = fx.patch(&VNode::from("b"), &VNode::from("a"));

        assert_eq!(fx.current(), node);
        assert_eq!(fx.doc.text(node), Some("b"));
        assert_eq!(
            mutations,
            vec![Mutation::SetText {
                node,
                text: "b".into()
            }]
        );
    }

    #[test]
    fn test_equal_text_is_noop() {
        let mut fx = setup();
        fx.mount(&VNode::from(7));
        assert!(fx.patch(&VNode::from("7"), &VNode::from(7)).is_empty());
    }

    #[test]
    fn test_text_to_element_replaces() {
        let mut fx = setup();
        let node = fx.mount(&VNode::from("a"));
        let new: VNode = Element::new("b").child("bold").into();
        fx.patch(&new, &VNode::from("a"));
        assert_ne!(fx.current(), node);
        assert_eq!(fx.html(), "<b>bold</b>");

        let element = fx.current();
        fx.patch(&VNode::from("plain"), &new);
        assert_ne!(fx.current(), element);
        assert_eq!(fx.html(), "plain");
    }

    #[test]
    fn test_tag_change_replaces_wholesale() {
        let mut fx = setup();
        let old: VNode = Element::new("div")
            .on("click", |_| {})
            .child(Element::new("em").on("click", |_| {}).child("x"))
            .into();
        let old_node = fx.mount(&old);
        let old_child = fx.doc.first_child(old_node).unwrap();

        let new: VNode = Element::new("span").child("y").into();
        fx.patch(&new, &old);

        let node = fx.current();
        assert_ne!(node, old_node);
        assert_eq!(fx.doc.tag_name(node), Some("span"));
        assert_eq!(fx.html(), "<span>y</span>");
        assert!(fx.doc.handler_names(node).is_empty());
        assert!(!fx.doc.contains(old_node));
        assert!(!fx.doc.contains(old_child));
    }

    #[test]
    fn test_attribute_diff_is_minimal() {
        let mut fx = setup();
        let old: VNode = Element::new("div").attr("class", "a").attr("id", "x").into();
        let node = fx.mount(&old);
        let new: VNode = Element::new("div").attr("class", "b").attr("id", "x").into();

        let mutations = fx.patch(&new, &old);
        assert_eq!(
            mutations,
            vec![Mutation::SetAttribute {
                node,
                name: "class".into(),
                value: "b".into()
            }]
        );
    }

    #[test]
    fn test_removed_attributes() {
        let mut fx = setup();
        let old: VNode = Element::new("input")
            .attr("placeholder", "todo")
            .attr("checked", true)
            .on("input", |_| {})
            .into();
        let node = fx.mount(&old);

        fx.patch(&Element::new("input").into(), &old);
        assert_eq!(fx.doc.attribute(node, "placeholder"), None);
        assert!(!fx.doc.property(node, BoolProp::Checked));
        assert!(fx.doc.handler_names(node).is_empty());
    }

    #[test]
    fn test_plain_key_turned_handler_drops_attribute() {
        let mut fx = setup();
        let old: VNode = Element::new("a").attr("title", "docs").into();
        let node = fx.mount(&old);
        let new: VNode = Element::new("a")
            .attr("title", AttrValue::handler(|_| {}))
            .into();

        let mutations = fx.patch(&new, &old);
        assert_eq!(fx.doc.attribute(node, "title"), None);
        assert!(fx.doc.handler_names(node).is_empty());
        assert_eq!(
            mutations,
            vec![Mutation::RemoveAttribute {
                node,
                name: "title".into()
            }]
        );
        assert!(mutations[0].is_attribute_write());
    }

    #[test]
    fn test_boolean_property_follows_new_value() {
        let mut fx = setup();
        let old: VNode = Element::new("input").attr("checked", false).into();
        let node = fx.mount(&old);
        assert!(!fx.doc.property(node, BoolProp::Checked));

        let checked: VNode = Element::new("input").attr("checked", true).into();
        fx.patch(&checked, &old);
        assert!(fx.doc.property(node, BoolProp::Checked));

        // Absent resets to false
        fx.patch(&Element::new("input").into(), &checked);
        assert!(!fx.doc.property(node, BoolProp::Checked));
    }

    #[test]
    fn test_handler_migration() {
        let mut fx = setup();
        let calls = Rc::new(RefCell::new(Vec::new()));
        let (f_calls, g_calls) = (calls.clone(), calls.clone());

        let old: VNode = Element::new("button")
            .on("click", move |_| f_calls.borrow_mut().push("f"))
            .into();
        let node = fx.mount(&old);
        let new: VNode = Element::new("button")
            .on("click", move |_| g_calls.borrow_mut().push("g"))
            .into();
        let mutations = fx.patch(&new, &old);
        assert!(mutations.iter().all(Mutation::is_handler_change));
        assert!(!mutations.iter().any(Mutation::is_attribute_write));

        let handler = fx.doc.handler(node, "click").unwrap();
        handler(&Event::click(node));
        assert_eq!(*calls.borrow(), vec!["g"]);
    }

    #[test]
    fn test_renamed_event_key_keeps_slot() {
        let mut fx = setup();
        let old: VNode = Element::new("button")
            .attr("onClick", AttrValue::handler(|_| {}))
            .into();
        let node = fx.mount(&old);
        let hits = Rc::new(Cell::new(0));
        let hits_clone = hits.clone();
        let new: VNode = Element::new("button")
            .on("click", move |_| hits_clone.set(hits_clone.get() + 1))
            .into();
        fx.patch(&new, &old);

        let handler = fx.doc.handler(node, "click").unwrap();
        handler(&Event::click(node));
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn test_children_grow() {
        let mut fx = setup();
        let old = list(&["a", "b"]);
        let node = fx.mount(&old);
        let kept: Vec<_> = fx.doc.children(node).to_vec();

        let mutations = fx.patch(&list(&["a", "B", "c", "d", "e"]), &old);

        let children = fx.doc.children(node);
        assert_eq!(children.len(), 5);
        assert_eq!(&children[..2], &kept[..]);
        let appended = mutations
            .iter()
            .filter(|m| matches!(m, Mutation::AppendChild { parent, .. } if *parent == node))
            .count();
        assert_eq!(appended, 3);
        assert_eq!(fx.html(), "<ul><li>a</li><li>B</li><li>c</li><li>d</li><li>e</li></ul>");
    }

    #[test]
    fn test_children_shrink() {
        let mut fx = setup();
        let old = list(&["a", "b", "c", "d", "e"]);
        let node = fx.mount(&old);
        let before: Vec<_> = fx.doc.children(node).to_vec();

        let mutations = fx.patch(&list(&["a", "b"]), &old);

        assert_eq!(fx.doc.children(node), &before[..2]);
        let removed: Vec<_> = mutations
            .iter()
            .filter_map(|m| match m {
                Mutation::Remove { node } => Some(*node),
                _ => None,
            })
            .collect();
        assert_eq!(removed, vec![before[4], before[3], before[2]]);
        assert_eq!(fx.html(), "<ul><li>a</li><li>b</li></ul>");
    }

    #[test]
    fn test_empty_children_filtered_before_diff() {
        let mut fx = setup();
        let old: VNode = Element::new("div")
            .child(VNode::Empty)
            .child("a")
            .into();
        let node = fx.mount(&old);
        let text = fx.doc.first_child(node).unwrap();

        let new: VNode = Element::new("div")
            .child("b")
            .child(VNode::Empty)
            .into();
        fx.patch(&new, &old);

        assert_eq!(fx.doc.first_child(node), Some(text));
        assert_eq!(fx.html(), "<div>b</div>");
    }

    #[test]
    fn test_reversed_list_rewrites_positions() {
        let mut fx = setup();
        let old = list(&["a", "b", "c"]);
        let node = fx.mount(&old);
        let before: Vec<_> = fx.doc.children(node).to_vec();

        let mutations = fx.patch(&list(&["c", "b", "a"]), &old);

        // Same nodes, contents rewritten; no moves
        assert_eq!(fx.doc.children(node), &before[..]);
        assert!(mutations.iter().all(|m| matches!(m, Mutation::SetText { .. })));
        assert_eq!(mutations.len(), 2);
    }

    #[test]
    fn test_update_records_node_ref() {
        let mut fx = setup();
        let old: VNode = Element::new("input").into();
        let node = fx.mount(&old);
        fx.refs.clear();

        let new: VNode = Element::new("input").node_ref("edit").into();
        fx.patch(&new, &old);
        assert_eq!(fx.refs.get("edit"), Some(node));
    }
}
