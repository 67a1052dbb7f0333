use crate::models::Post;

/// Inclusive budget and size bounds a post must fall in to be shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterWindow {
    pub min_price: i64,
    pub max_price: i64,
    pub min_rooms: i64,
    pub max_rooms: i64,
}

impl Default for FilterWindow {
    fn default() -> Self {
        Self {
            min_price: 5000,
            max_price: 6000,
            min_rooms: 3,
            max_rooms: 3,
        }
    }
}

impl FilterWindow {
    pub fn passes(&self, post: &Post) -> bool {
        passes_filters(post, self)
    }
}

/// `None` when the post has no price
pub fn within_price_budget(post: &Post, min: i64, max: i64) -> Option<bool> {
    post.price.map(|price| (min..=max).contains(&price))
}

/// `None` when the post has no room count
pub fn right_size(post: &Post, min: i64, max: i64) -> Option<bool> {
    post.rooms.map(|rooms| (min..=max).contains(&i64::from(rooms)))
}

pub fn has_text(post: &Post) -> bool {
    post.text.chars().count() > 1
}

/// Budget, size and text checks all hold. A missing attribute counts as a failure.
pub fn passes_filters(post: &Post, window: &FilterWindow) -> bool {
    within_price_budget(post, window.min_price, window.max_price).unwrap_or(false)
        && right_size(post, window.min_rooms, window.max_rooms).unwrap_or(false)
        && has_text(post)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(text: &str, price: Option<i64>, rooms: Option<u32>) -> Post {
        Post {
            text: text.to_string(),
            price,
            rooms,
            image_url: None,
            post_id: "p".to_string(),
        }
    }

    #[test]
    fn listing_inside_window_passes() {
        let p = post("דירה יפה ברמת גן, 20", Some(5500), Some(3));
        assert!(passes_filters(&p, &FilterWindow::default()));
    }

    #[test]
    fn bounds_are_inclusive() {
        let window = FilterWindow::default();
        assert!(window.passes(&post("text", Some(5000), Some(3))));
        assert!(window.passes(&post("text", Some(6000), Some(3))));
        assert!(!window.passes(&post("text", Some(4999), Some(3))));
        assert!(!window.passes(&post("text", Some(6001), Some(3))));
        assert!(!window.passes(&post("text", Some(5500), Some(4))));
    }

    #[test]
    fn missing_price_fails() {
        let p = post("text", None, Some(3));
        assert_eq!(within_price_budget(&p, 5000, 6000), None);
        assert!(!passes_filters(&p, &FilterWindow::default()));
    }

    #[test]
    fn missing_rooms_fails() {
        let p = post("text", Some(5500), None);
        assert_eq!(right_size(&p, 3, 3), None);
        assert!(!passes_filters(&p, &FilterWindow::default()));
    }

    #[test]
    fn short_text_never_passes() {
        let window = FilterWindow {
            min_price: i64::MIN,
            max_price: i64::MAX,
            min_rooms: i64::MIN,
            max_rooms: i64::MAX,
        };
        assert!(!window.passes(&post("", Some(5500), Some(3))));
        assert!(!window.passes(&post("x", Some(5500), Some(3))));
        assert!(!window.passes(&post("ד", Some(5500), Some(3))));
        assert!(window.passes(&post("די", Some(5500), Some(3))));
    }

    #[test]
    fn predicates_report_out_of_range() {
        let p = post("text", Some(7000), Some(5));
        assert_eq!(within_price_budget(&p, 5000, 6000), Some(false));
        assert_eq!(right_size(&p, 3, 4), Some(false));
        assert_eq!(right_size(&p, 3, 5), Some(true));
    }

    #[test]
    fn negative_room_bounds_are_accepted() {
        let window = FilterWindow {
            min_rooms: -1,
            max_rooms: 3,
            ..FilterWindow::default()
        };
        assert!(window.passes(&post("text", Some(5500), Some(0))));
        assert_eq!(right_size(&post("text", None, Some(2)), -5, -1), Some(false));
    }
}
