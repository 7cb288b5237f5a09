//! Searchable, type-filtered node palette.

use crate::catalog::{self, NodeCatalog};
use crate::node_types::{NodeDefinition, PortDefinition, PortDirection, PortType, can_connect};
use serde::{Deserialize, Serialize};

/// The port a connection is being dragged from.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourceSocket {
    pub port_type: PortType,
    /// Direction of the dragged port. An output socket looks for inputs.
    pub direction: PortDirection,
}

impl SourceSocket {
    pub fn output(port_type: PortType) -> Self {
        Self {
            port_type,
            direction: PortDirection::Output,
        }
    }

    pub fn input(port_type: PortType) -> Self {
        Self {
            port_type,
            direction: PortDirection::Input,
        }
    }

    /// Whether `port` on a new node could be wired to this socket.
    pub fn accepts(&self, port: &PortDefinition) -> bool {
        if port.port_type == self.port_type {
            return true;
        }
        match self.direction {
            PortDirection::Output => can_connect(self.port_type, port.port_type),
            PortDirection::Input => can_connect(port.port_type, self.port_type),
        }
    }

    /// First port of the opposite direction that accepts this socket. An
    /// exact type match beats a conversion.
    pub fn first_compatible<'a>(&self, ports: &'a [PortDefinition]) -> Option<&'a PortDefinition> {
        ports
            .iter()
            .find(|p| p.port_type == self.port_type)
            .or_else(|| ports.iter().find(|p| self.accepts(p)))
    }
}

#[derive(Clone, Debug, Default)]
pub struct QuickAddQuery {
    pub search: String,
    pub socket: Option<SourceSocket>,
    pub include_deprecated: bool,
}

impl QuickAddQuery {
    pub fn search(text: impl Into<String>) -> Self {
        Self {
            search: text.into(),
            ..Self::default()
        }
    }

    pub fn with_socket(mut self, socket: SourceSocket) -> Self {
        self.socket = Some(socket);
        self
    }

    pub fn matches(&self, def: &NodeDefinition) -> bool {
        // Boundary proxies only exist as part of a group
        if def.node_type == catalog::GROUP_INPUT || def.node_type == catalog::GROUP_OUTPUT {
            return false;
        }
        if def.is_deprecated() && !self.include_deprecated {
            return false;
        }
        self.matches_text(def) && self.matches_socket(def)
    }

    fn matches_text(&self, def: &NodeDefinition) -> bool {
        let needle = self.search.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        def.label.to_lowercase().contains(&needle)
            || def.description.to_lowercase().contains(&needle)
            || def.node_type.to_lowercase().contains(&needle)
            || def.keywords.iter().any(|k| k.to_lowercase().contains(&needle))
    }

    fn matches_socket(&self, def: &NodeDefinition) -> bool {
        match self.socket {
            None => true,
            Some(socket) => def
                .ports(socket.direction.opposite())
                .iter()
                .any(|p| socket.accepts(p)),
        }
    }
}

/// Matching definitions of one category.
#[derive(Clone, Debug)]
pub struct QuickAddGroup<'a> {
    pub category: String,
    pub name: String,
    pub definitions: Vec<&'a NodeDefinition>,
}

pub fn filter<'a>(catalog: &'a NodeCatalog, query: &QuickAddQuery) -> Vec<&'a NodeDefinition> {
    catalog.definitions().filter(|d| query.matches(d)).collect()
}

/// Matches grouped by category, in catalog category order. Categories the
/// catalog does not list come last, named by their id.
pub fn grouped<'a>(catalog: &'a NodeCatalog, query: &QuickAddQuery) -> Vec<QuickAddGroup<'a>> {
    let mut groups: Vec<QuickAddGroup<'a>> = catalog
        .categories()
        .iter()
        .map(|c| QuickAddGroup {
            category: c.id.clone(),
            name: c.name.clone(),
            definitions: Vec::new(),
        })
        .collect();
    let known = groups.len();

    for def in filter(catalog, query) {
        match groups.iter_mut().find(|g| g.category == def.category) {
            Some(group) => group.definitions.push(def),
            None => groups.push(QuickAddGroup {
                category: def.category.clone(),
                name: def.category.clone(),
                definitions: vec![def],
            }),
        }
    }

    // the layout category stays behind unlisted ones
    if let Some(pos) = groups[..known].iter().position(|g| g.category == catalog::LAYOUT_CATEGORY) {
        let layout = groups.remove(pos);
        groups.push(layout);
    }
    groups.retain(|g| !g.definitions.is_empty());
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin_nodes::standard_catalog;

    fn types(defs: &[&NodeDefinition]) -> Vec<String> {
        defs.iter().map(|d| d.node_type.clone()).collect()
    }

    #[test]
    fn text_and_socket_filters_are_conjunctive() {
        let catalog = standard_catalog();
        let by_text = filter(&catalog, &QuickAddQuery::search("chat"));
        assert!(types(&by_text).contains(&"trigger.on_chat".to_string()));

        // on_chat has no inputs, so dragging from an output rules it out
        let query = QuickAddQuery::search("chat").with_socket(SourceSocket::output(PortType::String));
        let found = types(&filter(&catalog, &query));
        assert!(found.contains(&"action.send_chat".to_string()));
        assert!(!found.contains(&"trigger.on_chat".to_string()));
    }

    #[test]
    fn socket_filter_uses_conversions_and_wildcards() {
        let catalog = standard_catalog();
        let query = QuickAddQuery::default().with_socket(SourceSocket::output(PortType::Number));
        let found = types(&filter(&catalog, &query));
        assert!(found.contains(&"action.log".to_string()));
        assert!(found.contains(&"logic.compare".to_string()));
        assert!(found.contains(&catalog::REROUTE.to_string()));
        assert!(!found.contains(&"action.attack".to_string()));
    }

    #[test]
    fn execution_socket_skips_wildcard_ports() {
        let catalog = standard_catalog();
        let query = QuickAddQuery::default().with_socket(SourceSocket::output(PortType::Execution));
        let found = types(&filter(&catalog, &query));
        assert!(found.contains(&"action.wait".to_string()));
        assert!(!found.contains(&catalog::REROUTE.to_string()));
        assert!(!found.contains(&"math.add".to_string()));
    }

    #[test]
    fn deprecated_hidden_by_default() {
        let catalog = standard_catalog();
        assert!(!types(&filter(&catalog, &QuickAddQuery::search("say"))).contains(&"action.say".to_string()));
        let query = QuickAddQuery {
            include_deprecated: true,
            ..QuickAddQuery::search("say")
        };
        assert!(types(&filter(&catalog, &query)).contains(&"action.say".to_string()));
    }

    #[test]
    fn groups_follow_category_order() {
        let catalog = standard_catalog();
        let groups = grouped(&catalog, &QuickAddQuery::default());
        let order: Vec<_> = groups.iter().map(|g| g.category.as_str()).collect();
        assert_eq!(order.first(), Some(&"trigger"));
        assert_eq!(order.last(), Some(&catalog::LAYOUT_CATEGORY));
        let layout = groups.last().unwrap();
        assert!(layout.definitions.iter().all(|d| d.node_type != catalog::GROUP_INPUT));
    }

    #[test]
    fn first_compatible_prefers_exact_type() {
        let ports = vec![
            PortDefinition::exec("exec_in", "Exec"),
            PortDefinition::new("flag", "Flag", PortType::Boolean),
            PortDefinition::new("count", "Count", PortType::Number),
        ];
        let socket = SourceSocket::output(PortType::Number);
        assert_eq!(socket.first_compatible(&ports).map(|p| p.id.as_str()), Some("count"));
        let socket = SourceSocket::output(PortType::String);
        assert_eq!(socket.first_compatible(&ports).map(|p| p.id.as_str()), Some("flag"));
    }
}
