use std::fmt;
use std::sync::Arc;

use crate::controllers::{
    AccountScreen, DashboardScreen, FeedbackScreen, GarbageBinsScreen, HouseholdScreen,
    PaymentScreen, SchedulingScreen, ScreenContext, SignInScreen, SubscriptionScreen,
};
use crate::scope::ScreenScope;
use crate::state::AppState;

pub const APP_TITLE: &str = "XWaste";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    SignIn,
    Dashboard,
    Register,
    Bins,
    Subscribe,
    Schedule,
    Payment,
    Feedback,
    Account,
}

impl Route {
    pub const ALL: [Route; 9] = [
        Route::SignIn,
        Route::Dashboard,
        Route::Register,
        Route::Bins,
        Route::Subscribe,
        Route::Schedule,
        Route::Payment,
        Route::Feedback,
        Route::Account,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Route::SignIn => "signin",
            Route::Dashboard => "dashboard",
            Route::Register => "register",
            Route::Bins => "bins",
            Route::Subscribe => "subscribe",
            Route::Schedule => "schedule",
            Route::Payment => "payment",
            Route::Feedback => "feedback",
            Route::Account => "account",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.as_str() == s)
    }

    pub fn title(&self) -> &'static str {
        match self {
            Route::SignIn => "Welcome to XWaste!",
            Route::Dashboard => "XWaste Dashboard",
            Route::Register => "Register Household",
            Route::Bins => "Select Garbage Bins",
            Route::Subscribe => "Subscription Plan",
            Route::Schedule => "Schedule Pickup",
            Route::Payment => "Card Payment",
            Route::Feedback => "Submit Feedback",
            Route::Account => "Account Details",
        }
    }

    pub fn requires_session(&self) -> bool {
        *self != Route::SignIn
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const DRAWER_ITEMS: [(&str, Route); 8] = [
    ("Dashboard", Route::Dashboard),
    ("Register Household", Route::Register),
    ("Garbage Bins", Route::Bins),
    ("Subscription", Route::Subscribe),
    ("Scheduling", Route::Schedule),
    ("Payment", Route::Payment),
    ("Feedback", Route::Feedback),
    ("Account", Route::Account),
];

#[derive(Clone)]
pub enum Screen {
    SignIn(Arc<SignInScreen>),
    Dashboard(Arc<DashboardScreen>),
    Household(Arc<HouseholdScreen>),
    GarbageBins(Arc<GarbageBinsScreen>),
    Subscription(Arc<SubscriptionScreen>),
    Payment(Arc<PaymentScreen>),
    Scheduling(Arc<SchedulingScreen>),
    Feedback(Arc<FeedbackScreen>),
    Account(Arc<AccountScreen>),
}

impl Screen {
    fn build(route: Route, state: &AppState, scope: ScreenScope) -> Self {
        let ctx = ScreenContext {
            notifier: state.notifier.clone(),
            scope,
        };
        match route {
            Route::SignIn => Screen::SignIn(Arc::new(SignInScreen::new(ctx, state.auth.clone()))),
            Route::Dashboard => Screen::Dashboard(Arc::new(DashboardScreen::new())),
            Route::Register => Screen::Household(Arc::new(HouseholdScreen::new(
                ctx,
                state.data.clone(),
                state.map.clone(),
            ))),
            Route::Bins => {
                Screen::GarbageBins(Arc::new(GarbageBinsScreen::new(ctx, state.data.clone())))
            }
            Route::Subscribe => {
                Screen::Subscription(Arc::new(SubscriptionScreen::new(ctx, state.data.clone())))
            }
            Route::Payment => Screen::Payment(Arc::new(PaymentScreen::new(ctx))),
            Route::Schedule => {
                Screen::Scheduling(Arc::new(SchedulingScreen::new(ctx, state.data.clone())))
            }
            Route::Feedback => {
                Screen::Feedback(Arc::new(FeedbackScreen::new(ctx, state.data.clone())))
            }
            Route::Account => Screen::Account(Arc::new(AccountScreen::new(
                ctx,
                state.auth.clone(),
                state.data.clone(),
            ))),
        }
    }

    pub fn route(&self) -> Route {
        match self {
            Screen::SignIn(_) => Route::SignIn,
            Screen::Dashboard(_) => Route::Dashboard,
            Screen::Household(_) => Route::Register,
            Screen::GarbageBins(_) => Route::Bins,
            Screen::Subscription(_) => Route::Subscribe,
            Screen::Payment(_) => Route::Payment,
            Screen::Scheduling(_) => Route::Schedule,
            Screen::Feedback(_) => Route::Feedback,
            Screen::Account(_) => Route::Account,
        }
    }

    pub async fn enter(&self) {
        match self {
            Screen::GarbageBins(s) => s.load().await,
            Screen::Account(s) => {
                // Failures have already been shown as a toast.
                let _ = s.load().await;
            }
            _ => {}
        }
    }
}

pub struct Shell {
    state: Arc<AppState>,
    drawer_open: bool,
    stack: Vec<Route>,
    scope: ScreenScope,
    screen: Screen,
}

impl Shell {
    pub fn new(state: Arc<AppState>) -> Self {
        let start = if state.session.is_signed_in() {
            Route::Dashboard
        } else {
            Route::SignIn
        };
        let scope = ScreenScope::new();
        let screen = Screen::build(start, &state, scope.clone());
        Self {
            state,
            drawer_open: false,
            stack: vec![start],
            scope,
            screen,
        }
    }

    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }

    pub fn current_route(&self) -> Route {
        self.screen.route()
    }

    pub fn screen(&self) -> Screen {
        self.screen.clone()
    }

    pub fn back_stack(&self) -> &[Route] {
        &self.stack
    }

    pub fn is_drawer_open(&self) -> bool {
        self.drawer_open
    }

    pub fn open_drawer(&mut self) {
        self.drawer_open = true;
    }

    pub fn close_drawer(&mut self) {
        self.drawer_open = false;
    }

    // Shows `route` on top of the back stack and returns the new screen.
    // Without a session every destination resolves to sign-in.
    pub fn navigate(&mut self, route: Route) -> Screen {
        let route = if route.requires_session() && !self.state.session.is_signed_in() {
            tracing::debug!(requested = %route, "no session, redirecting to sign-in");
            Route::SignIn
        } else {
            route
        };

        match route {
            // Entering or leaving the sign-in flow starts a fresh task.
            Route::SignIn => self.stack.clear(),
            Route::Dashboard if self.current_route() == Route::SignIn => self.stack.clear(),
            _ => {}
        }
        self.stack.push(route);
        self.show(route)
    }

    pub fn select_drawer_item(&mut self, route: Route) -> Screen {
        self.close_drawer();
        self.navigate(route)
    }

    pub fn back(&mut self) -> Option<Screen> {
        if self.stack.len() <= 1 {
            return None;
        }
        self.stack.pop();
        let route = *self.stack.last()?;
        Some(self.show(route))
    }

    pub fn open_account(&mut self) -> Screen {
        self.navigate(Route::Account)
    }

    pub fn logout(&mut self) -> Screen {
        self.state.auth.sign_out();
        self.navigate(Route::SignIn)
    }

    fn show(&mut self, route: Route) -> Screen {
        self.drawer_open = false;
        self.scope.cancel();
        self.scope = ScreenScope::new();
        self.screen = Screen::build(route, &self.state, self.scope.clone());
        tracing::debug!(route = %route, depth = self.stack.len(), "navigated");
        self.screen.clone()
    }
}
