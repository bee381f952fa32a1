use poise::serenity_prelude as serenity;
use std::str::FromStr;

pub const HISTORY_BUTTON_PREFIX: &str = "confession_history";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageAction {
    First,
    Previous,
    Next,
    Last,
}

impl PageAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            PageAction::First => "first",
            PageAction::Previous => "prev",
            PageAction::Next => "next",
            PageAction::Last => "last",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            PageAction::First => "⏮️ First",
            PageAction::Previous => "◀️ Previous",
            PageAction::Next => "Next ▶️",
            PageAction::Last => "Last ⏭️",
        }
    }
}

impl FromStr for PageAction {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "first" => Ok(PageAction::First),
            "prev" => Ok(PageAction::Previous),
            "next" => Ok(PageAction::Next),
            "last" => Ok(PageAction::Last),
            _ => Err(anyhow::anyhow!("Unknown page action: {}", s)),
        }
    }
}

/// Page arithmetic over a listing of `total` items. Page 0 holds the oldest items
/// and the last page the newest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    total: usize,
    page_size: usize,
}

impl Pager {
    pub fn new(total: usize, page_size: usize) -> Self {
        Self {
            total,
            page_size: page_size.max(1),
        }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// An empty listing still has one (empty) page.
    pub fn page_count(&self) -> usize {
        self.total.div_ceil(self.page_size).max(1)
    }

    pub fn last_page(&self) -> usize {
        self.page_count() - 1
    }

    pub fn clamp(&self, page: usize) -> usize {
        page.min(self.last_page())
    }

    /// Target page for `action` from `current`, never wrapping past either end.
    pub fn navigate(&self, current: usize, action: PageAction) -> usize {
        let current = self.clamp(current);
        match action {
            PageAction::First => 0,
            PageAction::Previous => current.saturating_sub(1),
            PageAction::Next => self.clamp(current + 1),
            PageAction::Last => self.last_page(),
        }
    }

    pub fn offset(&self, page: usize) -> usize {
        self.clamp(page) * self.page_size
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn create_nav_buttons(&self, page: usize) -> serenity::CreateActionRow {
        let page = self.clamp(page);
        let at_start = page == 0;
        let at_end = page == self.last_page();

        let buttons = [
            (PageAction::First, at_start),
            (PageAction::Previous, at_start),
            (PageAction::Next, at_end),
            (PageAction::Last, at_end),
        ]
        .into_iter()
        .map(|(action, disabled)| {
            serenity::CreateButton::new(history_button_id(action, page))
                .label(action.label())
                .style(serenity::ButtonStyle::Secondary)
                .disabled(disabled)
        })
        .collect();

        serenity::CreateActionRow::Buttons(buttons)
    }
}

pub fn history_button_id(action: PageAction, current_page: usize) -> String {
    format!("{}:{}:{}", HISTORY_BUTTON_PREFIX, action.as_str(), current_page)
}

/// Parses `confession_history:<action>:<page>`.
pub fn parse_history_button_id(custom_id: &str) -> Option<(PageAction, usize)> {
    let mut parts = custom_id.split(':');
    if parts.next()? != HISTORY_BUTTON_PREFIX {
        return None;
    }
    let action = parts.next()?.parse().ok()?;
    let page = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((action, page))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_count() {
        assert_eq!(Pager::new(0, 10).page_count(), 1);
        assert_eq!(Pager::new(10, 10).page_count(), 1);
        assert_eq!(Pager::new(11, 10).page_count(), 2);
        assert_eq!(Pager::new(25, 10).last_page(), 2);
    }

    #[test]
    fn test_navigation_clamps_instead_of_wrapping() {
        let pager = Pager::new(25, 10);
        assert_eq!(pager.navigate(0, PageAction::Previous), 0);
        assert_eq!(pager.navigate(2, PageAction::Next), 2);
        assert_eq!(pager.navigate(1, PageAction::Next), 2);
        assert_eq!(pager.navigate(1, PageAction::Previous), 0);
        assert_eq!(pager.navigate(1, PageAction::First), 0);
        assert_eq!(pager.navigate(0, PageAction::Last), 2);
    }

    #[test]
    fn test_stale_page_is_clamped_after_listing_shrinks() {
        // The button was rendered when there were more pages than there are now.
        let pager = Pager::new(5, 10);
        assert_eq!(pager.navigate(7, PageAction::Previous), 0);
        assert_eq!(pager.navigate(7, PageAction::Next), 0);
        assert_eq!(pager.offset(7), 0);
    }

    #[test]
    fn test_offset() {
        let pager = Pager::new(25, 10);
        assert_eq!(pager.offset(0), 0);
        assert_eq!(pager.offset(2), 20);
    }

    #[test]
    fn test_button_id_parsing() {
        let id = history_button_id(PageAction::Next, 3);
        assert_eq!(id, "confession_history:next:3");
        assert_eq!(parse_history_button_id(&id), Some((PageAction::Next, 3)));
        assert_eq!(parse_history_button_id("confession_history:next"), None);
        assert_eq!(parse_history_button_id("confession_history:sideways:1"), None);
        assert_eq!(parse_history_button_id("confession_approve:3"), None);
    }
}
