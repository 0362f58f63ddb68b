use std::cmp::Ordering;

use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::models::{BookingStatus, BookingView, ClassView, ClientStatus, ClientView, User};

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

/// Lowercased search term, `None` when blank.
fn normalized(search: Option<&str>) -> Option<String> {
    search
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase)
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ClassFilter {
    #[default]
    All,
    Active,
    Inactive,
    Full,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ClassSort {
    #[default]
    Date,
    Name,
    Capacity,
    Bookings,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(default)]
#[into_params(parameter_in = Query)]
pub struct ClassQuery {
    pub search: Option<String>,
    pub filter: ClassFilter,
    pub sort: ClassSort,
    pub order: SortOrder,
}

pub fn filter_classes(mut classes: Vec<ClassView>, query: &ClassQuery) -> Vec<ClassView> {
    if let Some(term) = normalized(query.search.as_deref()) {
        classes.retain(|c| contains_ci(&c.class.name, &term) || contains_ci(&c.class.day, &term));
    }

    match query.filter {
        ClassFilter::All => {}
        ClassFilter::Active => classes.retain(|c| c.class.enabled),
        ClassFilter::Inactive => classes.retain(|c| !c.class.enabled),
        ClassFilter::Full => classes.retain(ClassView::is_full),
    }

    classes.sort_by(|a, b| {
        let ordering = match query.sort {
            ClassSort::Name => a.class.name.to_lowercase().cmp(&b.class.name.to_lowercase()),
            ClassSort::Date => a.class.date.cmp(&b.class.date),
            ClassSort::Capacity => a.class.capacity.cmp(&b.class.capacity),
            ClassSort::Bookings => a.current_bookings.cmp(&b.current_bookings),
        };
        query.order.apply(ordering)
    });
    classes
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ClientFilter {
    #[default]
    All,
    Active,
    Warning,
    Expired,
    NoPackage,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq, ToSchema)]
pub enum ClientSort {
    #[default]
    #[serde(rename = "name")]
    Name,
    #[serde(rename = "joinDate")]
    JoinDate,
    #[serde(rename = "bookings")]
    Bookings,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(default)]
#[into_params(parameter_in = Query)]
pub struct ClientQuery {
    pub search: Option<String>,
    pub filter: ClientFilter,
    pub sort: ClientSort,
    pub order: SortOrder,
}

pub fn filter_clients(mut clients: Vec<ClientView>, query: &ClientQuery) -> Vec<ClientView> {
    if let Some(term) = normalized(query.search.as_deref()) {
        clients.retain(|c| contains_ci(&c.name, &term) || contains_ci(&c.email, &term));
    }

    match query.filter {
        ClientFilter::All => {}
        ClientFilter::Active => clients.retain(|c| c.status == ClientStatus::Active),
        ClientFilter::Warning => clients.retain(|c| c.status == ClientStatus::Warning),
        ClientFilter::Expired => clients.retain(|c| c.status == ClientStatus::Expired),
        ClientFilter::NoPackage => clients.retain(|c| c.packages.is_empty()),
    }

    clients.sort_by(|a, b| {
        let ordering = match query.sort {
            ClientSort::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            ClientSort::JoinDate => a.join_date.cmp(&b.join_date),
            ClientSort::Bookings => a.total_bookings.cmp(&b.total_bookings),
        };
        query.order.apply(ordering)
    });
    clients
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BookingFilter {
    #[default]
    All,
    Active,
    Cancelled,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(default)]
#[into_params(parameter_in = Query)]
pub struct BookingQuery {
    pub status: BookingFilter,
    pub search: Option<String>,
}

pub fn filter_bookings(mut bookings: Vec<BookingView>, query: &BookingQuery) -> Vec<BookingView> {
    match query.status {
        BookingFilter::All => {}
        BookingFilter::Active => bookings.retain(|b| b.status == BookingStatus::Active),
        BookingFilter::Cancelled => bookings.retain(|b| b.status == BookingStatus::Cancelled),
    }

    if let Some(term) = normalized(query.search.as_deref()) {
        bookings.retain(|b| {
            contains_ci(&b.class_name, &term)
                || contains_ci(&b.client.name, &term)
                || contains_ci(&b.client.email, &term)
                || contains_ci(&b.id.to_string(), &term)
        });
    }
    bookings
}

/// Users who hold no active booking for `class`, optionally narrowed by search.
pub fn available_users(users: Vec<User>, class: &ClassView, search: Option<&str>) -> Vec<User> {
    let term = normalized(search);
    users
        .into_iter()
        .filter(|u| {
            !class
                .bookings
                .iter()
                .any(|b| b.user_id == u.id && b.status == BookingStatus::Active)
        })
        .filter(|u| match &term {
            Some(term) => contains_ci(&u.name, term) || contains_ci(&u.email, term),
            None => true,
        })
        .collect()
}
