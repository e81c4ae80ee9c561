//! Navigation tree of built pages.

use std::collections::BTreeMap;

/// Hierarchy of the built pages, keyed by permalink segments.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FileTree {
    pub nodes: Vec<TreeNode>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TreeNode {
    Folder {
        name: String,
        /// Slash path of the folder, e.g. `notes/daily`.
        key: String,
        children: Vec<TreeNode>,
    },
    Page {
        name: String,
        title: String,
        /// `/` followed by the permalink.
        url: String,
    },
}

#[derive(Default)]
struct FolderBuilder {
    folders: BTreeMap<String, FolderBuilder>,
    pages: Vec<TreeNode>,
}

impl FolderBuilder {
    fn finish(self, prefix: &str) -> Vec<TreeNode> {
        let mut nodes: Vec<TreeNode> = self
            .folders
            .into_iter()
            .map(|(name, folder)| {
                let key = if prefix.is_empty() {
                    name.clone()
                } else {
                    format!("{prefix}/{name}")
                };
                TreeNode::Folder {
                    children: folder.finish(&key),
                    name,
                    key,
                }
            })
            .collect();

        let mut pages = self.pages;
        pages.sort_by(|a, b| a.name().cmp(b.name()));
        nodes.extend(pages);
        nodes
    }
}

impl TreeNode {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Folder { name, .. } | Self::Page { name, .. } => name,
        }
    }
}

impl FileTree {
    /// Build the tree from `(permalink, title)` pairs. Folders come before
    /// pages at every level, each sorted by name.
    pub fn from_pages<'a>(pages: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut root = FolderBuilder::default();
        for (permalink, title) in pages {
            let mut segments: Vec<&str> = permalink.split('/').filter(|s| !s.is_empty()).collect();
            let name = segments.pop().unwrap_or_default();
            let folder = segments.into_iter().fold(&mut root, |folder, segment| {
                folder.folders.entry(segment.to_owned()).or_default()
            });
            folder.pages.push(TreeNode::Page {
                name: name.to_owned(),
                title: title.to_owned(),
                url: format!("/{permalink}"),
            });
        }
        Self {
            nodes: root.finish(""),
        }
    }

    /// Number of pages in the tree.
    #[must_use]
    pub fn page_count(&self) -> usize {
        fn count(nodes: &[TreeNode]) -> usize {
            nodes
                .iter()
                .map(|node| match node {
                    TreeNode::Folder { children, .. } => count(children),
                    TreeNode::Page { .. } => 1,
                })
                .sum()
        }
        count(&self.nodes)
    }
}
