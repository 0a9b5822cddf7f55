use crate::shell::Route;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    pub label: &'static str,
    pub route: Route,
}

const TILES: [Tile; 6] = [
    Tile { label: "Register Household", route: Route::Register },
    Tile { label: "Get Garbage Bins", route: Route::Bins },
    Tile { label: "Start Subscription", route: Route::Subscribe },
    Tile { label: "Scheduling", route: Route::Schedule },
    Tile { label: "Payment", route: Route::Payment },
    Tile { label: "Feedback", route: Route::Feedback },
];

#[derive(Debug, Default)]
pub struct DashboardScreen;

impl DashboardScreen {
    pub fn new() -> Self {
        Self
    }

    pub fn title(&self) -> &'static str {
        "XWaste Dashboard"
    }

    pub fn tiles(&self) -> &'static [Tile] {
        &TILES
    }

    pub fn open(&self, index: usize) -> Option<Route> {
        TILES.get(index).map(|t| t.route)
    }
}
