//! Plain-text rendering of directory pages.

use userdir_core::{PageView, UserRecord};

/// Card for a single user, one field per line.
pub fn user_card(user: &UserRecord) -> String {
    format!(
        "#{}\n  Name: {}\n  Username: {}\n  Email: {}\n  Website: {}",
        user.id,
        user.display_name(),
        user.username,
        user.email,
        if user.website.is_empty() { "-" } else { user.website.as_str() },
    )
}

/// Cards for one page followed by the "Page X of Y" footer.
pub fn page(view: &PageView) -> String {
    let mut out = String::new();
    if view.is_empty() {
        out.push_str("No users.\n");
    }
    for user in &view.items {
        out.push_str(&user_card(user));
        out.push_str("\n\n");
    }

    let mut footer = view.label();
    if view.has_prev() {
        footer.push_str(&format!("  (prev: --page {})", view.number - 1));
    }
    if view.has_next() {
        footer.push_str(&format!("  (next: --page {})", view.number + 1));
    }
    out.push_str(&footer);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: u64, website: &str) -> UserRecord {
        UserRecord {
            id,
            name: "Chelsey Dietrich".to_string(),
            username: "Kamren".to_string(),
            email: "Lucio_Hettinger@annie.ca".to_string(),
            website: website.to_string(),
        }
    }

    #[test]
    fn test_user_card() {
        let card = user_card(&user(5, "demarco.info"));
        assert_eq!(
            card,
            "#5\n  Name: Chelsey Dietrich\n  Username: Kamren\n  Email: Lucio_Hettinger@annie.ca\n  Website: demarco.info"
        );
    }

    #[test]
    fn test_user_card_without_website() {
        assert!(user_card(&user(5, "")).ends_with("Website: -"));
    }

    #[test]
    fn test_page_footer_navigation_hints() {
        let view = PageView {
            number: 2,
            total_pages: 3,
            total_items: 14,
            items: vec![user(8, "x.org")],
        };
        let out = page(&view);
        assert!(out.contains("#8"));
        assert!(out.ends_with("Page 2 of 3  (prev: --page 1)  (next: --page 3)"));
    }

    #[test]
    fn test_empty_page() {
        let view = PageView {
            number: 1,
            total_pages: 0,
            total_items: 0,
            items: vec![],
        };
        assert_eq!(page(&view), "No users.\nPage 1 of 0");
    }
}
