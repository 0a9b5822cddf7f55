use std::sync::Arc;

use anyhow::Context;
use chrono::NaiveDate;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_stream::StreamExt;
use tracing_subscriber::EnvFilter;

use xwaste::config::AppConfig;
use xwaste::controllers::BinKind;
use xwaste::models::{Coordinate, PaymentMethod, Plan};
use xwaste::notify::ToastKind;
use xwaste::shell::{Route, Screen, Shell, APP_TITLE, DRAWER_ITEMS};
use xwaste::state::AppState;

const HELP: &str = "\
commands:
  go <route>            open a screen (signin dashboard register bins subscribe schedule payment feedback account)
  menu                  toggle the side menu
  back                  previous screen
  account | logout      top-bar actions
  show                  print the current form
  set <field> <value>   edit a text field
  toggle <bin>          organic | recyclable | non-recyclable
  pick <YYYY-MM-DD>     date picker
  plan <monthly|yearly>
  method <mpesa|card>
  locate                find the typed household location on the map
  tap <lat> <lon>       pick the household location on the map
  mode                  switch between sign-in and register
  google <id-token>     sign in with a Google id token
  edit | save | cancel  account details
  submit
  quit";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let state = Arc::new(AppState::from_config(&config).context("failed to start")?);

    let mut toasts = state.notifier.subscribe();
    tokio::spawn(async move {
        while let Some(Ok(toast)) = toasts.next().await {
            match toast.kind {
                ToastKind::Info => println!("  > {}", toast.message),
                ToastKind::Error => println!("  ! {}", toast.message),
            }
        }
    });

    let mut shell = Shell::new(state);
    println!("{APP_TITLE}: type `help` for commands");
    print_screen(&shell);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "quit" || line == "exit" {
            break;
        }
        if let Err(e) = dispatch(&mut shell, line).await {
            println!("  ? {e}");
        }
    }

    Ok(())
}

async fn dispatch(shell: &mut Shell, line: &str) -> anyhow::Result<()> {
    let (cmd, rest) = line.split_once(' ').unwrap_or((line, ""));
    let rest = rest.trim();

    match cmd {
        "help" => println!("{HELP}"),
        "show" => print_screen(shell),
        "menu" => {
            if shell.is_drawer_open() {
                shell.close_drawer();
            } else {
                shell.open_drawer();
                for (label, route) in DRAWER_ITEMS {
                    println!("  - {label} ({route})");
                }
            }
        }
        "go" => {
            let route = Route::parse(rest).with_context(|| format!("unknown route: {rest}"))?;
            let screen = if shell.is_drawer_open() {
                shell.select_drawer_item(route)
            } else {
                shell.navigate(route)
            };
            enter(shell, screen);
        }
        "back" => match shell.back() {
            Some(screen) => enter(shell, screen),
            None => println!("  (already at the first screen)"),
        },
        "account" => {
            let screen = shell.open_account();
            enter(shell, screen);
        }
        "logout" => {
            shell.logout();
            print_screen(shell);
        }
        "submit" => submit(shell).await?,
        _ => edit(shell, cmd, rest).await?,
    }
    Ok(())
}

fn enter(shell: &Shell, screen: Screen) {
    print_screen(shell);
    tokio::spawn(async move { screen.enter().await });
}

async fn submit(shell: &mut Shell) -> anyhow::Result<()> {
    // Failures are reported through toasts; only navigation matters here.
    let next = match shell.screen() {
        Screen::SignIn(s) => s.submit().await.ok(),
        Screen::Household(s) => s.submit().await.ok().map(|_| Route::Dashboard),
        Screen::GarbageBins(s) => s.submit().await.ok().and(None),
        Screen::Subscription(s) => s.submit().await.ok().and_then(|o| o.next),
        Screen::Payment(s) => s.submit().ok().and(None),
        Screen::Scheduling(s) => s.submit().await.ok().and(None),
        Screen::Feedback(s) => s.submit().await.ok().and(None),
        Screen::Account(s) => s.save().await.ok().and(None),
        Screen::Dashboard(_) => anyhow::bail!("nothing to submit here"),
    };
    if let Some(route) = next {
        let screen = shell.navigate(route);
        enter(shell, screen);
    }
    Ok(())
}

async fn edit(shell: &mut Shell, cmd: &str, rest: &str) -> anyhow::Result<()> {
    let (field, value) = rest.split_once(' ').unwrap_or((rest, ""));
    let value = value.trim();

    match (shell.screen(), cmd) {
        (Screen::SignIn(s), "set") => match field {
            "username" => s.set_username(value),
            "email" => s.set_email(value),
            "phone" => s.set_phone(value),
            "password" => s.set_password(value),
            _ => anyhow::bail!("unknown field: {field}"),
        },
        (Screen::SignIn(s), "mode") => {
            s.toggle_mode();
            println!("  mode: {:?}", s.form().mode);
        }
        (Screen::SignIn(s), "google") => {
            if let Ok(route) = s.sign_in_with_google(rest).await {
                let screen = shell.navigate(route);
                enter(shell, screen);
            }
        }
        (Screen::Dashboard(d), "open") => {
            let index: usize = rest.parse().context("expected a tile number")?;
            let route = d.open(index).context("no such tile")?;
            let screen = shell.navigate(route);
            enter(shell, screen);
        }
        (Screen::Household(s), "set") => match field {
            "name" => s.set_household_name(value),
            "location" => s.set_location(value),
            _ => anyhow::bail!("unknown field: {field}"),
        },
        (Screen::Household(s), "locate") => {
            if let Ok(place) = s.locate().await {
                println!("  pin at {}, {}", place.at.latitude, place.at.longitude);
            }
        }
        (Screen::Household(s), "tap") => {
            let (lat, lon) = rest.split_once(' ').context("expected <lat> <lon>")?;
            let at = Coordinate::new(
                lat.trim().parse().context("invalid latitude")?,
                lon.trim().parse().context("invalid longitude")?,
            );
            if let Ok(address) = s.select_on_map(at).await {
                println!("  location: {address}");
            }
        }
        (Screen::GarbageBins(s), "set") if field == "address" => s.set_delivery_address(value),
        (Screen::GarbageBins(s), "toggle") => {
            let kind = BinKind::parse(rest).with_context(|| format!("unknown bin: {rest}"))?;
            s.toggle_bin(kind);
        }
        (Screen::Subscription(s), "plan") => {
            s.select_plan(Plan::parse(rest).with_context(|| format!("unknown plan: {rest}"))?);
        }
        (Screen::Subscription(s), "method") => {
            let method =
                PaymentMethod::parse(rest).with_context(|| format!("unknown method: {rest}"))?;
            s.select_payment_method(method);
        }
        (Screen::Subscription(s), "pick") => s.pick_payment_date(parse_date(rest)?),
        (Screen::Payment(s), "set") => match field {
            "card" => s.set_card_number(value),
            "expiry" => s.set_expiry_date(value),
            "cvv" => s.set_cvv(value),
            _ => anyhow::bail!("unknown field: {field}"),
        },
        (Screen::Scheduling(s), "pick") => s.pick_date(parse_date(rest)?),
        (Screen::Feedback(s), "set") => match field {
            "email" => s.set_email(value),
            "message" => s.set_message(value),
            _ => anyhow::bail!("unknown field: {field}"),
        },
        (Screen::Account(s), "edit") => s.edit(),
        (Screen::Account(s), "cancel") => s.cancel_edit(),
        (Screen::Account(s), "save") => {
            let _ = s.save().await;
        }
        (Screen::Account(s), "set") => {
            if !s.set_field(field, value) {
                anyhow::bail!("cannot change {field} now");
            }
        }
        _ => anyhow::bail!("unknown command here: {cmd} (try `help`)"),
    }
    Ok(())
}

fn parse_date(s: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| format!("invalid date: {s}"))
}

fn print_screen(shell: &Shell) {
    let route = shell.current_route();
    println!("[{APP_TITLE}] {}", route.title());
    match shell.screen() {
        Screen::SignIn(s) => {
            let f = s.form();
            println!("  {:?} email={} username={} phone={}", f.mode, f.email, f.username, f.phone);
        }
        Screen::Dashboard(d) => {
            for (i, tile) in d.tiles().iter().enumerate() {
                println!("  {i}: {} ({})", tile.label, tile.route);
            }
            println!("  (open <n> to choose a tile)");
        }
        Screen::Household(s) => {
            let f = s.form();
            println!("  name={} location={}", f.household_name, f.location);
            if let Some(m) = f.map.marker {
                println!("  pin '{}' at {}, {}", m.title, m.at.latitude, m.at.longitude);
            }
        }
        Screen::GarbageBins(s) => {
            let f = s.form();
            println!("  address={}", f.delivery_address);
            for (kind, on) in [
                (BinKind::Organic, f.organic),
                (BinKind::Recyclable, f.recyclable),
                (BinKind::NonRecyclable, f.non_recyclable),
            ] {
                println!("  [{}] {}", if on { "x" } else { " " }, kind.label());
            }
        }
        Screen::Subscription(s) => {
            let f = s.form();
            println!(
                "  plan={} ({}) date={} method={}",
                f.plan.as_str(),
                f.plan.price_label(),
                f.payment_date.unwrap_or_default(),
                f.payment_method.map(|m| m.as_str()).unwrap_or("-"),
            );
        }
        Screen::Payment(s) => {
            let f = s.form();
            println!("  card={} expiry={} cvv={}", f.card_number, f.expiry_date, f.cvv);
        }
        Screen::Scheduling(s) => println!("  date={}", s.form().date),
        Screen::Feedback(s) => {
            let f = s.form();
            println!("  email={} message={}", f.email, f.message);
        }
        Screen::Account(s) => {
            println!("  {}", s.title());
            for (k, v) in s.form().edits {
                println!("  {k}: {v}");
            }
        }
    }
}
