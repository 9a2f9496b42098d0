//! Navigation routes and the pre-navigation guard.
//!
//! The guard is a fast, synchronous, memory-only check: token present means
//! allow. Authoritative validation happens lazily when the first API call is
//! made and possibly rejected with a 401.

use crate::session::SessionService;
use tokio::sync::watch;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Login { expired: bool },
    Dashboard,
    Protected(String),
}

/// Watch-backed current route so independently-mounted fragments can follow
/// navigation without polling.
#[derive(Debug)]
pub struct Navigator {
    route: watch::Sender<Route>,
}

impl Default for Navigator {
    fn default() -> Self {
        Self {
            route: watch::Sender::new(Route::Login { expired: false }),
        }
    }
}

impl Navigator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn navigate(&self, route: Route) {
        self.route.send_replace(route);
    }

    #[must_use]
    pub fn current(&self) -> Route {
        self.route.borrow().clone()
    }

    #[must_use]
    pub fn changes(&self) -> watch::Receiver<Route> {
        self.route.subscribe()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Redirect(Route),
}

/// Guard a navigation target. The login route itself is always reachable.
#[must_use]
pub fn check(session: &SessionService, target: &Route) -> Decision {
    if matches!(target, Route::Login { .. }) || session.is_authenticated() {
        Decision::Allow
    } else {
        Decision::Redirect(Route::Login { expired: false })
    }
}

/// Guard plus redirect: on deny, sends the navigator to the login route and
/// returns false.
pub fn can_activate(session: &SessionService, navigator: &Navigator, target: &Route) -> bool {
    match check(session, target) {
        Decision::Allow => true,
        Decision::Redirect(login) => {
            navigator.navigate(login);
            false
        }
    }
}
