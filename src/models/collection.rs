use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Users,
    Households,
    GarbageBins,
    Subscriptions,
    Scheduling,
    Feedback,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::Households => "households",
            Collection::GarbageBins => "garbageBins",
            Collection::Subscriptions => "subscriptions",
            Collection::Scheduling => "scheduling",
            // Capitalized on the server; kept for compatibility with existing data.
            Collection::Feedback => "Feedback",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
