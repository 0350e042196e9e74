/// Accordion selection state over the immutable release list.
///
/// At most one release is expanded, at most one asset is selected, and a
/// selected asset always belongs to the expanded release; the variants make
/// any other combination unrepresentable. Indices point into the release
/// list, which is only replaced wholesale (resetting the state with it).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    Collapsed,
    Expanded {
        release: usize,
    },
    Selected {
        release: usize,
        asset: usize,
    },
}

impl Selection {
    /// Index of the expanded release, if any.
    pub fn expanded_release(&self) -> Option<usize> {
        match self {
            Selection::Collapsed => None,
            Selection::Expanded { release } | Selection::Selected { release, .. } => Some(*release),
        }
    }

    /// Indices of the selected asset as (release, asset), if any.
    pub fn selected_asset(&self) -> Option<(usize, usize)> {
        match self {
            Selection::Selected { release, asset } => Some((*release, *asset)),
            _ => None,
        }
    }
}
