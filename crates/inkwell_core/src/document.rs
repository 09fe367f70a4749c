//! Live editing document and the mutator operations the upload flow uses.
//!
//! Content is an ordered list of block nodes with a cursor (insertion index).
//! Upload placeholders, notices and batch indicators are first-class node
//! variants addressed by generated [`NodeId`]s; they are never part of the
//! canonical serialisation returned by [`Document::to_canonical_html`].

use std::fmt;

use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::{BatchId, TaskId};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
    Info,
    Cancelled,
}

impl NoticeKind {
    /// Error notices stay until the user dismisses them.
    pub fn auto_dismisses(self) -> bool {
        !matches!(self, NoticeKind::Error)
    }

    fn css_class(self) -> &'static str {
        match self {
            NoticeKind::Success => "notice-success",
            NoticeKind::Error => "notice-error",
            NoticeKind::Info => "notice-info",
            NoticeKind::Cancelled => "notice-cancelled",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageNode {
    pub src: String,
    pub alt: String,
    pub public_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    pub id: NodeId,
    pub task_id: TaskId,
    pub file_name: String,
    pub progress: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub id: NodeId,
    pub kind: NoticeKind,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchProgress {
    pub id: NodeId,
    pub batch_id: BatchId,
    pub completed: usize,
    pub total: usize,
}

impl BatchProgress {
    pub fn label(&self) -> String {
        format!("{} of {} processed", self.completed, self.total)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Paragraph { text: String },
    Image(ImageNode),
    Placeholder(Placeholder),
    Notice(Notice),
    BatchProgress(BatchProgress),
}

impl Node {
    pub fn paragraph(text: impl Into<String>) -> Self {
        Node::Paragraph { text: text.into() }
    }

    /// Id of a transient marker node; content nodes have none.
    pub fn marker_id(&self) -> Option<&NodeId> {
        match self {
            Node::Placeholder(p) => Some(&p.id),
            Node::Notice(n) => Some(&n.id),
            Node::BatchProgress(b) => Some(&b.id),
            Node::Paragraph { .. } | Node::Image(_) => None,
        }
    }

    pub fn is_marker(&self) -> bool {
        self.marker_id().is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Document {
    nodes: Vec<Node>,
    cursor: usize,
    next_marker: u64,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Document with existing content and the cursor at the end.
    pub fn from_nodes(nodes: Vec<Node>) -> Self {
        let cursor = nodes.len();
        Self {
            nodes,
            cursor,
            next_marker: 0,
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Moves the cursor, clamped to the end of the document.
    pub fn set_cursor(&mut self, position: usize) {
        self.cursor = position.min(self.nodes.len());
    }

    /// Inserts at the current cursor and moves the cursor past the new node.
    pub fn insert_at_cursor(&mut self, node: Node) {
        let at = self.cursor.min(self.nodes.len());
        self.nodes.insert(at, node);
        self.cursor = at + 1;
    }

    pub fn insert_paragraph(&mut self, text: impl Into<String>) {
        self.insert_at_cursor(Node::paragraph(text));
    }

    pub fn insert_image(&mut self, image: ImageNode) {
        self.insert_at_cursor(Node::Image(image));
    }

    pub fn insert_placeholder(&mut self, task_id: TaskId, file_name: &str, progress: u8) -> NodeId {
        let id = self.next_id("upload");
        self.insert_at_cursor(Node::Placeholder(Placeholder {
            id: id.clone(),
            task_id,
            file_name: file_name.to_string(),
            progress: progress.min(100),
        }));
        id
    }

    pub fn insert_notice(&mut self, kind: NoticeKind, message: impl Into<String>) -> NodeId {
        let id = self.next_id("notice");
        self.insert_at_cursor(Node::Notice(Notice {
            id: id.clone(),
            kind,
            message: message.into(),
        }));
        id
    }

    pub fn insert_batch_progress(&mut self, batch_id: BatchId, total: usize) -> NodeId {
        let id = self.next_id("batch");
        self.insert_at_cursor(Node::BatchProgress(BatchProgress {
            id: id.clone(),
            batch_id,
            completed: 0,
            total,
        }));
        id
    }

    /// Detaches the marker with `id`. A missing node is not an error; the
    /// return value only reports whether anything was removed.
    pub fn remove(&mut self, id: &NodeId) -> bool {
        let Some(index) = self.position_of(id) else {
            return false;
        };
        self.nodes.remove(index);
        if index < self.cursor {
            self.cursor -= 1;
        }
        true
    }

    /// Updates a placeholder's progress bar in place.
    pub fn set_progress(&mut self, id: &NodeId, progress: u8) -> bool {
        match self.find_mut(id) {
            Some(Node::Placeholder(placeholder)) => {
                placeholder.progress = progress.min(100);
                true
            }
            _ => false,
        }
    }

    pub fn set_batch_completed(&mut self, id: &NodeId, completed: usize) -> bool {
        match self.find_mut(id) {
            Some(Node::BatchProgress(batch)) => {
                batch.completed = completed.min(batch.total);
                true
            }
            _ => false,
        }
    }

    pub fn find(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.iter().find(|node| node.marker_id() == Some(id))
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.find(id).is_some()
    }

    pub fn placeholders(&self) -> impl Iterator<Item = &Placeholder> {
        self.nodes.iter().filter_map(|node| match node {
            Node::Placeholder(p) => Some(p),
            _ => None,
        })
    }

    pub fn notices(&self) -> impl Iterator<Item = &Notice> {
        self.nodes.iter().filter_map(|node| match node {
            Node::Notice(n) => Some(n),
            _ => None,
        })
    }

    pub fn batch_indicators(&self) -> impl Iterator<Item = &BatchProgress> {
        self.nodes.iter().filter_map(|node| match node {
            Node::BatchProgress(b) => Some(b),
            _ => None,
        })
    }

    pub fn images(&self) -> impl Iterator<Item = &ImageNode> {
        self.nodes.iter().filter_map(|node| match node {
            Node::Image(image) => Some(image),
            _ => None,
        })
    }

    /// Resource ids of the images in the document, in document order.
    pub fn image_references(&self) -> Vec<&str> {
        self.images()
            .filter_map(|image| image.public_id.as_deref())
            .collect()
    }

    /// Persistable HTML: content nodes only, markers stripped.
    pub fn to_canonical_html(&self) -> String {
        let mut out = String::new();
        for node in self.nodes.iter().filter(|node| !node.is_marker()) {
            render_node(node, &mut out);
        }
        out
    }

    /// HTML of everything the user currently sees, markers included.
    pub fn to_live_html(&self) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            render_node(node, &mut out);
        }
        out
    }

    fn next_id(&mut self, prefix: &str) -> NodeId {
        self.next_marker += 1;
        NodeId(format!("{prefix}-{}", self.next_marker))
    }

    fn position_of(&self, id: &NodeId) -> Option<usize> {
        self.nodes
            .iter()
            .position(|node| node.marker_id() == Some(id))
    }

    fn find_mut(&mut self, id: &NodeId) -> Option<&mut Node> {
        self.nodes
            .iter_mut()
            .find(|node| node.marker_id() == Some(id))
    }
}

fn render_node(node: &Node, out: &mut String) {
    match node {
        Node::Paragraph { text } => {
            out.push_str("<p>");
            out.push_str(&encode_text(text));
            out.push_str("</p>");
        }
        Node::Image(image) => {
            out.push_str("<img src=\"");
            out.push_str(&encode_double_quoted_attribute(&image.src));
            out.push_str("\" alt=\"");
            out.push_str(&encode_double_quoted_attribute(&image.alt));
            out.push('"');
            if let Some(public_id) = &image.public_id {
                out.push_str(" data-public-id=\"");
                out.push_str(&encode_double_quoted_attribute(public_id));
                out.push('"');
            }
            out.push('>');
        }
        Node::Placeholder(p) => {
            out.push_str(&format!(
                "<div class=\"upload-placeholder\" data-node-id=\"{id}\" data-task-id=\"{task}\">\
                 <span class=\"upload-file\">{name}</span>\
                 <div class=\"upload-progress-bar\" style=\"width: {pct}%\"></div>\
                 <span class=\"upload-progress-text\">{pct}%</span>\
                 <button class=\"upload-cancel\" data-cancel-task=\"{task}\">Cancel</button>\
                 </div>",
                id = encode_double_quoted_attribute(p.id.as_str()),
                task = p.task_id,
                name = encode_text(&p.file_name),
                pct = p.progress,
            ));
        }
        Node::Notice(n) => {
            out.push_str(&format!(
                "<div class=\"notice {class}\" data-node-id=\"{id}\">\
                 <span class=\"notice-message\">{message}</span>\
                 <button class=\"notice-dismiss\" data-dismiss=\"{id}\">Dismiss</button>\
                 </div>",
                class = n.kind.css_class(),
                id = encode_double_quoted_attribute(n.id.as_str()),
                message = encode_text(&n.message),
            ));
        }
        Node::BatchProgress(b) => {
            out.push_str(&format!(
                "<div class=\"batch-progress\" data-node-id=\"{id}\">{label}</div>",
                id = encode_double_quoted_attribute(b.id.as_str()),
                label = encode_text(&b.label()),
            ));
        }
    }
}
