//! Domain model: playbooks and plays, and the graph values derived from them.

mod graph_edge;
mod graph_node;
mod log_entry;
mod node_path;
mod notice;
mod play;
mod playbook;

pub use graph_edge::{EdgeId, EdgeOrigin, EdgeState, GraphEdge};
pub use graph_node::{CompletionState, GraphNode, NODE_BORDER, Position};
pub use log_entry::{ContextLogEntry, DockerLogEntry, LogScope, LogSnapshot};
pub use node_path::{NodePath, PathStep};
pub use notice::{Notice, NoticeLevel};
pub use play::Play;
pub use playbook::{Playbook, find_play, play_and_playbook_names};
