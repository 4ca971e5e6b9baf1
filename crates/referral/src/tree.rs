//! Referral tree construction
//!
//! The tree is an arena of nodes addressed by [`NodeId`]. Each node keeps its
//! parent index and the indices of its children, and an `AccountId → NodeId`
//! index is maintained as accounts are inserted.
//!
//! ## Construction rules
//! - Accounts are processed in the order the account source yields them
//! - A referrer is resolved through the index at insertion time, so an account
//!   listed before its referrer does not find it
//! - Unresolved referrers attach to the root unless an explicit root account
//!   was requested, in which case the account lies outside the subtree and is
//!   skipped
//! - After each insertion every ancestor records the new account's balance at
//!   its relative level
//!
//! A node can only be attached below an already inserted node, so every parent
//! chain ends at the root.

use crate::balance::BalanceLookup;
use crate::errors::{ReferralError, Result};
use crate::leaf::LeafInfo;
use crate::params::ReferralParams;
use refnet_types::{AccountId, AccountRecord, Amount};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Stable index of a node in the tree arena.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct NodeId(usize);

impl NodeId {
    pub const fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    leaf: LeafInfo,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    depth: u32,
}

impl Node {
    pub fn leaf(&self) -> &LeafInfo {
        &self.leaf
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Distance from the root (the root has depth 0).
    pub fn depth(&self) -> u32 {
        self.depth
    }
}

/// Counters describing how the account source was consumed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildStats {
    pub accounts_seen: usize,
    pub inserted: usize,
    /// Records whose referrer is not in the requested subtree.
    pub skipped_outside_root: usize,
    /// Records naming the root account itself.
    pub skipped_root_record: usize,
}

#[derive(Debug, Clone)]
pub struct ReferralTree {
    nodes: Vec<Node>,
    index: HashMap<AccountId, NodeId>,
    root_account: Option<AccountId>,
    stats: BuildStats,
}

impl ReferralTree {
    const ROOT: NodeId = NodeId(0);

    /// Build the tree from an ordered account source.
    ///
    /// With `root_account`, only accounts transitively referred by it are
    /// included; otherwise accounts with unresolved referrers hang off a
    /// synthetic root identified by [`AccountId::NULL`]. Requesting
    /// `AccountId::NULL` as root is the same as requesting no root.
    pub fn build<I, B>(
        accounts: I,
        balances: &B,
        root_account: Option<AccountId>,
        params: &ReferralParams,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = AccountRecord>,
        B: BalanceLookup + ?Sized,
    {
        let root_account = root_account.filter(|id| !id.is_null());
        let root_id = root_account.unwrap_or(AccountId::NULL);
        let mut tree = Self::with_root(root_id, balances.balance_of(&root_id), root_account);
        let partner_threshold = params.partner_threshold_amount();

        for record in accounts {
            tree.stats.accounts_seen += 1;

            if record.id == root_id {
                tree.stats.skipped_root_record += 1;
                continue;
            }
            if tree.index.contains_key(&record.id) {
                return Err(ReferralError::DuplicateAccount(record.id));
            }

            let referrer = record
                .referrer
                .and_then(|referrer| tree.index.get(&referrer).copied());
            let parent = match referrer {
                Some(node) => node,
                None if root_account.is_none() => Self::ROOT,
                None => {
                    tree.stats.skipped_outside_root += 1;
                    debug!(
                        target: "referral",
                        "Account {} skipped: referrer {:?} is outside the subtree of {}",
                        record.id,
                        record.referrer,
                        root_id
                    );
                    continue;
                }
            };

            let balance = balances.balance_of(&record.id);
            let node = tree.attach(parent, record.id, balance);
            tree.propagate(node, record.id, balance, partner_threshold);
        }

        debug!(
            target: "referral",
            "Built referral tree rooted at {}: {} nodes from {} records ({} outside subtree)",
            root_id,
            tree.nodes.len(),
            tree.stats.accounts_seen,
            tree.stats.skipped_outside_root
        );

        Ok(tree)
    }

    fn with_root(account_id: AccountId, balance: Amount, root_account: Option<AccountId>) -> Self {
        let root = Node {
            leaf: LeafInfo::new(account_id, balance),
            parent: None,
            children: Vec::new(),
            depth: 0,
        };
        let mut index = HashMap::new();
        index.insert(account_id, Self::ROOT);

        Self {
            nodes: vec![root],
            index,
            root_account,
            stats: BuildStats::default(),
        }
    }

    fn attach(&mut self, parent: NodeId, account_id: AccountId, balance: Amount) -> NodeId {
        let id = NodeId(self.nodes.len());
        let depth = self.nodes[parent.0].depth + 1;
        self.nodes.push(Node {
            leaf: LeafInfo::new(account_id, balance),
            parent: Some(parent),
            children: Vec::new(),
            depth,
        });
        self.nodes[parent.0].children.push(id);
        self.index.insert(account_id, id);
        self.stats.inserted += 1;
        id
    }

    /// Credit `balance` to every ancestor of `from`, one level further each step.
    fn propagate(&mut self, from: NodeId, account_id: AccountId, balance: Amount, threshold: Amount) {
        let mut level = 1;
        let mut cursor = self.nodes[from.0].parent;
        while let Some(ancestor) = cursor {
            let node = &mut self.nodes[ancestor.0];
            node.leaf
                .add_child_balance(account_id, balance, level, threshold);
            cursor = node.parent;
            level += 1;
        }
    }

    pub fn root(&self) -> NodeId {
        Self::ROOT
    }

    /// Account requested as root, `None` for the synthetic root.
    pub fn root_account(&self) -> Option<AccountId> {
        self.root_account
    }

    /// Number of nodes, root included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn stats(&self) -> &BuildStats {
        &self.stats
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn leaf(&self, id: NodeId) -> Option<&LeafInfo> {
        self.node(id).map(Node::leaf)
    }

    pub fn find(&self, account: &AccountId) -> Option<NodeId> {
        self.index.get(account).copied()
    }

    /// Aggregates of `account`, failing when it is not in the tree.
    pub fn leaf_of(&self, account: &AccountId) -> Result<&LeafInfo> {
        self.find(account)
            .and_then(|id| self.leaf(id))
            .ok_or(ReferralError::UnknownAccount(*account))
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(Node::parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(Node::children).unwrap_or(&[])
    }

    pub fn depth(&self, id: NodeId) -> Option<u32> {
        self.node(id).map(Node::depth)
    }

    /// Ancestors of `id`, nearest first, ending at the root.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |current| self.parent(*current))
    }

    /// Nodes in arena (insertion) order, root first.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (NodeId(index), node))
    }

    /// Depth-first traversal from the root, children in insertion order.
    pub fn preorder(&self) -> Preorder<'_> {
        Preorder {
            tree: self,
            stack: vec![Self::ROOT],
        }
    }
}

/// Iterator returned by [`ReferralTree::preorder`].
pub struct Preorder<'a> {
    tree: &'a ReferralTree,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for Preorder<'a> {
    type Item = (NodeId, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let tree = self.tree;
        let node = &tree.nodes[id.0];
        self.stack.extend(node.children.iter().rev().copied());
        Some((id, node))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.stack.len(), Some(self.tree.nodes.len()))
    }
}
