// ── Notifications container ──

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationEvent {
    MarkAllRead,
    SetUnread(u32),
}

/// Standalone unread counter. No network call feeds it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NotificationsState {
    pub unread_count: u32,
}

impl NotificationsState {
    pub fn reduce(&mut self, event: NotificationEvent) {
        match event {
            NotificationEvent::MarkAllRead => self.unread_count = 0,
            NotificationEvent::SetUnread(count) => self.unread_count = count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mark_all_read_resets_counter() {
        let mut state = NotificationsState::default();
        state.reduce(NotificationEvent::SetUnread(3));
        assert_eq!(state.unread_count, 3);
        state.reduce(NotificationEvent::MarkAllRead);
        assert_eq!(state.unread_count, 0);
    }
}
