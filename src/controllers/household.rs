use std::sync::Mutex;

use crate::errors::AppResult;
use crate::gateways::{Created, DataGateway, MapAdapter, MapView};
use crate::models::{Collection, Coordinate, Household};
use crate::services::geocoding::Place;

use super::{lock, require_filled, FormSession, ScreenContext};

#[derive(Debug, Clone, Default)]
pub struct HouseholdForm {
    pub household_name: String,
    pub location: String,
    pub coordinate: Option<Coordinate>,
    pub map: MapView,
    pub session: FormSession,
}

pub struct HouseholdScreen {
    ctx: ScreenContext,
    data: DataGateway,
    map: MapAdapter,
    form: Mutex<HouseholdForm>,
}

impl HouseholdScreen {
    pub fn new(ctx: ScreenContext, data: DataGateway, map: MapAdapter) -> Self {
        Self {
            ctx,
            data,
            map,
            form: Mutex::new(HouseholdForm::default()),
        }
    }

    pub fn context(&self) -> &ScreenContext {
        &self.ctx
    }

    pub fn form(&self) -> HouseholdForm {
        lock(&self.form).clone()
    }

    pub fn set_household_name(&self, name: &str) {
        let mut form = lock(&self.form);
        form.household_name = name.to_string();
        form.session.touch();
    }

    // Typing a new location invalidates any previously resolved coordinate.
    pub fn set_location(&self, location: &str) {
        let mut form = lock(&self.form);
        form.location = location.to_string();
        form.coordinate = None;
        form.session.touch();
    }

    pub async fn locate(&self) -> AppResult<Place> {
        let text = lock(&self.form).location.clone();
        let result = self.ctx.scope.run(self.map.forward_geocode(&text)).await;
        let place = self.ctx.surface("household", result)?;

        let mut form = lock(&self.form);
        if form.location == text {
            form.coordinate = Some(place.at);
            let title = marker_title(&form.household_name);
            self.map.render_marker(&mut form.map, place.at, &title);
        }
        Ok(place)
    }

    pub async fn select_on_map(&self, at: Coordinate) -> AppResult<String> {
        let result = self.ctx.scope.run(self.map.reverse_geocode(at)).await;
        let address = self.ctx.surface("household", result)?;

        let mut form = lock(&self.form);
        form.location = address.clone();
        form.coordinate = Some(at);
        form.session.touch();
        let title = marker_title(&form.household_name);
        self.map.render_marker(&mut form.map, at, &title);
        Ok(address)
    }

    pub async fn submit(&self) -> AppResult<Created> {
        let (name, location, coordinate, key) = {
            let form = lock(&self.form);
            let checked = require_filled(&[&form.household_name, &form.location]);
            if let Err(e) = checked {
                drop(form);
                return self.ctx.surface("household", Err(e));
            }
            (
                form.household_name.trim().to_string(),
                form.location.trim().to_string(),
                form.coordinate,
                form.session.key().clone(),
            )
        };

        let at = match coordinate {
            Some(at) => at,
            None => self.locate().await?.at,
        };

        let household = Household::new(&name, &location, at);
        let result = self
            .ctx
            .scope
            .run(self.data.create(Collection::Households, &household, &key))
            .await;
        let created = self.ctx.surface("household", result)?;

        let mut form = lock(&self.form);
        if form.session.complete(&key) {
            let session = form.session.clone();
            *form = HouseholdForm {
                session,
                ..HouseholdForm::default()
            };
            self.ctx.notifier.info("Household registered!");
        }
        Ok(created)
    }
}

fn marker_title(name: &str) -> String {
    if name.trim().is_empty() {
        "Household".to_string()
    } else {
        name.trim().to_string()
    }
}
