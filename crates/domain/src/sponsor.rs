//! Referral hierarchy of administrators, sponsors and their members.
//!
//! The hierarchy is stored as an arena of nodes indexed by user ID. Every node
//! knows its parent and its children, which allows cycles to be rejected when
//! a node is moved.

use std::collections::{BTreeMap, BTreeSet};

use log::debug;
use strum::{AsRefStr, EnumIter};

use crate::UserID;

#[derive(AsRefStr, EnumIter, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[strum(serialize_all = "snake_case")]
pub enum Role {
    Admin,
    Sponsor,
    SubSponsor,
    Member,
}

impl Role {
    #[must_use]
    pub fn can_sponsor(self, child: Role) -> bool {
        match self {
            Role::Admin => child != Role::Admin,
            Role::Sponsor => matches!(child, Role::SubSponsor | Role::Member),
            Role::SubSponsor => matches!(child, Role::SubSponsor | Role::Member),
            Role::Member => false,
        }
    }

    #[must_use]
    pub fn default_permissions(self) -> BTreeSet<Permission> {
        match self {
            Role::Admin => BTreeSet::from([
                Permission::ViewTeam,
                Permission::ManageUsers,
                Permission::ManageSponsors,
                Permission::ManageOrders,
                Permission::ManageProducts,
            ]),
            Role::Sponsor => BTreeSet::from([
                Permission::ViewTeam,
                Permission::ManageUsers,
                Permission::ManageOrders,
            ]),
            Role::SubSponsor => BTreeSet::from([Permission::ViewTeam, Permission::ManageOrders]),
            Role::Member => BTreeSet::new(),
        }
    }
}

#[derive(AsRefStr, EnumIter, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[strum(serialize_all = "snake_case")]
pub enum Permission {
    ViewTeam,
    ManageUsers,
    ManageSponsors,
    ManageOrders,
    ManageProducts,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: UserID,
    pub role: Role,
    pub parent: Option<UserID>,
    pub children: Vec<UserID>,
    pub permissions: BTreeSet<Permission>,
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum SponsorError {
    #[error("unknown user {0}")]
    Unknown(UserID),
    #[error("user {0} already exists")]
    Duplicate(UserID),
    #[error("moving {id} below {parent} would create a cycle")]
    Cycle { id: UserID, parent: UserID },
    #[error("{parent:?} must not sponsor {child:?}")]
    RoleNotAllowed { parent: Role, child: Role },
    #[error("user {0} still has team members")]
    HasChildren(UserID),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TeamAggregate {
    pub count: usize,
    pub sum: f64,
    pub mean: f64,
}

#[derive(Debug, Default, Clone)]
pub struct SponsorTree {
    nodes: BTreeMap<UserID, Node>,
}

impl SponsorTree {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, id: UserID) -> Option<&Node> {
        self.nodes.get(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn roots(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values().filter(|n| n.parent.is_none())
    }

    pub fn add_admin(&mut self, id: UserID) -> Result<(), SponsorError> {
        if self.nodes.contains_key(&id) {
            return Err(SponsorError::Duplicate(id));
        }
        self.nodes.insert(id, Self::node(id, Role::Admin, None));
        Ok(())
    }

    pub fn add(&mut self, id: UserID, role: Role, parent: UserID) -> Result<(), SponsorError> {
        if self.nodes.contains_key(&id) {
            return Err(SponsorError::Duplicate(id));
        }
        let parent_node = self.node_mut(parent)?;
        if !parent_node.role.can_sponsor(role) {
            return Err(SponsorError::RoleNotAllowed {
                parent: parent_node.role,
                child: role,
            });
        }
        parent_node.children.push(id);
        self.nodes.insert(id, Self::node(id, role, Some(parent)));
        Ok(())
    }

    /// Move a node together with its team below a new parent.
    pub fn reassign(&mut self, id: UserID, new_parent: UserID) -> Result<(), SponsorError> {
        let role = self.node_ref(id)?.role;
        let parent_role = self.node_ref(new_parent)?.role;
        if id == new_parent || self.ancestors(new_parent)?.contains(&id) {
            return Err(SponsorError::Cycle {
                id,
                parent: new_parent,
            });
        }
        if !parent_role.can_sponsor(role) {
            return Err(SponsorError::RoleNotAllowed {
                parent: parent_role,
                child: role,
            });
        }
        let old_parent = self.node_ref(id)?.parent;
        if let Some(old_parent) = old_parent {
            self.node_mut(old_parent)?.children.retain(|c| *c != id);
        }
        self.node_mut(new_parent)?.children.push(id);
        self.node_mut(id)?.parent = Some(new_parent);
        debug!("moved {id} below {new_parent}");
        Ok(())
    }

    /// Remove a node without team members.
    pub fn remove(&mut self, id: UserID) -> Result<Node, SponsorError> {
        let node = self.node_ref(id)?;
        if !node.children.is_empty() {
            return Err(SponsorError::HasChildren(id));
        }
        let parent = node.parent;
        if let Some(parent) = parent {
            self.node_mut(parent)?.children.retain(|c| *c != id);
        }
        self.nodes.remove(&id).ok_or(SponsorError::Unknown(id))
    }

    pub fn parent(&self, id: UserID) -> Result<Option<UserID>, SponsorError> {
        Ok(self.node_ref(id)?.parent)
    }

    pub fn children(&self, id: UserID) -> Result<&[UserID], SponsorError> {
        Ok(&self.node_ref(id)?.children)
    }

    /// Parent, grandparent and so on up to the root.
    pub fn ancestors(&self, id: UserID) -> Result<Vec<UserID>, SponsorError> {
        let mut result = vec![];
        let mut current = self.node_ref(id)?.parent;
        while let Some(parent) = current {
            if result.contains(&parent) {
                break;
            }
            result.push(parent);
            current = self.node_ref(parent)?.parent;
        }
        Ok(result)
    }

    /// All direct and indirect team members in pre-order.
    pub fn team(&self, id: UserID) -> Result<Vec<UserID>, SponsorError> {
        let mut result = vec![];
        let mut stack = self
            .node_ref(id)?
            .children
            .iter()
            .rev()
            .copied()
            .collect::<Vec<_>>();
        while let Some(member) = stack.pop() {
            result.push(member);
            stack.extend(self.node_ref(member)?.children.iter().rev().copied());
        }
        Ok(result)
    }

    pub fn team_size(&self, id: UserID) -> Result<usize, SponsorError> {
        Ok(self.team(id)?.len())
    }

    pub fn manages(&self, manager: UserID, member: UserID) -> Result<bool, SponsorError> {
        self.node_ref(manager)?;
        Ok(self.ancestors(member)?.contains(&manager))
    }

    pub fn grant(&mut self, id: UserID, permission: Permission) -> Result<(), SponsorError> {
        self.node_mut(id)?.permissions.insert(permission);
        Ok(())
    }

    pub fn revoke(&mut self, id: UserID, permission: Permission) -> Result<(), SponsorError> {
        self.node_mut(id)?.permissions.remove(&permission);
        Ok(())
    }

    pub fn has_permission(&self, id: UserID, permission: Permission) -> Result<bool, SponsorError> {
        Ok(self.node_ref(id)?.permissions.contains(&permission))
    }

    /// Aggregate a value over the team of a node, members without a value are
    /// skipped.
    pub fn aggregate<F>(&self, id: UserID, value: F) -> Result<Option<TeamAggregate>, SponsorError>
    where
        F: Fn(UserID) -> Option<f64>,
    {
        let values = self
            .team(id)?
            .into_iter()
            .filter_map(value)
            .collect::<Vec<_>>();
        if values.is_empty() {
            return Ok(None);
        }
        let sum = values.iter().sum::<f64>();
        #[allow(clippy::cast_precision_loss)]
        let mean = sum / values.len() as f64;
        Ok(Some(TeamAggregate {
            count: values.len(),
            sum,
            mean,
        }))
    }

    fn node(id: UserID, role: Role, parent: Option<UserID>) -> Node {
        Node {
            id,
            role,
            parent,
            children: vec![],
            permissions: role.default_permissions(),
        }
    }

    fn node_ref(&self, id: UserID) -> Result<&Node, SponsorError> {
        self.nodes.get(&id).ok_or(SponsorError::Unknown(id))
    }

    fn node_mut(&mut self, id: UserID) -> Result<&mut Node, SponsorError> {
        self.nodes.get_mut(&id).ok_or(SponsorError::Unknown(id))
    }
}
