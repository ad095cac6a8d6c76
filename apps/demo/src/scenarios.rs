//! The walkthroughs behind each subcommand. Each returns the lines to print.

use herald::object::{AsObject, Object, connect, connect_slot};
use herald::pubsub::{Publisher, Subscription};
use herald::{ConnectionHandle, Emitter, EmitterConfig, HeraldError};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tracing::info;

herald::events! {
    /// A person's name changed.
    pub struct NameChanged(String);
    pub struct Clicked();
    pub struct Opened();
}

type Lines = Rc<RefCell<Vec<String>>>;

fn labelled(config: &EmitterConfig, name: &str) -> EmitterConfig {
    EmitterConfig { label: format!("{}.{name}", config.label), ..config.clone() }
}

/// Someone with a name that announces its changes.
#[derive(Debug)]
pub struct Person {
    name: RefCell<String>,
    events: Emitter,
}

impl Person {
    /// # Errors
    /// Returns [`HeraldError::InvalidConfiguration`] for invalid options.
    pub fn new(config: &EmitterConfig) -> Result<Self, HeraldError> {
        Ok(Self {
            name: RefCell::new("John Doe".to_owned()),
            events: Emitter::with_config(labelled(config, "person"))?,
        })
    }

    pub const fn events(&self) -> &Emitter {
        &self.events
    }

    /// Emits [`NameChanged`] if the name differs from the current one.
    pub fn set_name(&self, name: &str) {
        if *self.name.borrow() == name {
            return;
        }
        name.clone_into(&mut self.name.borrow_mut());
        self.events.emit(NameChanged, (name.to_owned(),));
    }
}

/// Greets every new name.
///
/// # Errors
/// Returns [`HeraldError::InvalidConfiguration`] for invalid options.
pub fn person(names: &[String], config: &EmitterConfig) -> Result<Vec<String>, HeraldError> {
    let person = Person::new(config)?;
    let lines = Lines::default();

    let out = Rc::clone(&lines);
    let _greeter: ConnectionHandle = person
        .events()
        .on(NameChanged, move |name: &String| out.borrow_mut().push(format!("Hello {name}!")))
        .into();

    for name in names {
        person.set_name(name);
    }
    info!(changes = lines.borrow().len(), "Person walkthrough finished");
    Ok(lines.take())
}

#[derive(Debug)]
struct Button {
    object: Object,
}

impl AsObject for Button {
    fn object(&self) -> &Object {
        &self.object
    }
}

impl Button {
    fn click(&self) {
        self.object.emit(Clicked, ());
    }
}

#[derive(Debug)]
struct Dialog {
    object: Object,
    visible: Cell<bool>,
}

impl AsObject for Dialog {
    fn object(&self) -> &Object {
        &self.object
    }
}

impl Dialog {
    fn open(&self) {
        self.visible.set(true);
        self.object.emit(Opened, ());
    }
}

/// Clicks a button wired to a dialog, then drops the dialog and clicks again.
///
/// # Errors
/// Returns [`HeraldError::InvalidConfiguration`] for invalid options.
pub fn widgets(clicks: u32, config: &EmitterConfig) -> Result<Vec<String>, HeraldError> {
    let button = Button { object: Object::with_config(labelled(config, "button"))? };
    let opened = Rc::new(Cell::new(0_u32));
    let mut lines = Vec::new();

    {
        let dialog = Rc::new(Dialog {
            object: Object::with_config(labelled(config, "dialog"))?,
            visible: Cell::new(false),
        });
        connect_slot(&button, Clicked, &dialog, Dialog::open);
        let counter = Rc::clone(&opened);
        connect(&*dialog, Opened, move || counter.set(counter.get() + 1));

        for _ in 0..clicks {
            button.click();
        }
        lines.push(format!(
            "Clicked {clicks} times: dialog opened {} times (visible: {})",
            opened.get(),
            dialog.visible.get()
        ));
    }

    button.click();
    lines.push(format!(
        "Dialog closed: opened {} times, button has {} listeners",
        opened.get(),
        button.object().emitter().listener_count()
    ));
    Ok(lines)
}

/// A lunch guest.
pub trait Diner {
    fn say_hello(&self);
    fn eat_it(&self, meal: &str);
}

struct Guest {
    greeting: &'static str,
    favourite: &'static str,
    compliment: &'static str,
    complaint: &'static str,
    lines: Lines,
    subscription: RefCell<Option<Subscription<dyn Diner>>>,
}

impl Diner for Guest {
    fn say_hello(&self) {
        self.lines.borrow_mut().push(self.greeting.to_owned());
    }

    fn eat_it(&self, meal: &str) {
        let line = if meal == self.favourite { self.compliment } else { self.complaint };
        self.lines.borrow_mut().push(line.to_owned());
    }
}

impl Guest {
    fn seat(self, publisher: &Publisher<dyn Diner>) -> Rc<Self> {
        let guest = Rc::new(self);
        let diner: Rc<dyn Diner> = guest.clone();
        *guest.subscription.borrow_mut() = publisher.subscribe(&diner);
        guest
    }
}

fn have_lunch(publisher: &Publisher<dyn Diner>) {
    publisher.notify(|guest| guest.eat_it("🥖"));
    publisher.notify(|guest| guest.eat_it("🍻"));
}

/// French and German guests at a typed publisher.
#[must_use]
pub fn lunch() -> Vec<String> {
    let publisher: Publisher<dyn Diner> = Publisher::new();
    let lines = Lines::default();

    let french = Guest {
        greeting: "Bonjour!",
        favourite: "🥖",
        compliment: "J'aime la baguette.",
        complaint: "Il manque le fromage...",
        lines: Rc::clone(&lines),
        subscription: RefCell::new(None),
    }
    .seat(&publisher);
    let german = Guest {
        greeting: "Guten Tag!",
        favourite: "🍻",
        compliment: "Zwei bier!",
        complaint: "Ein kilogramm kartoffel, bitte!",
        lines: Rc::clone(&lines),
        subscription: RefCell::new(None),
    }
    .seat(&publisher);

    publisher.notify(|guest| guest.say_hello());
    have_lunch(&publisher);

    drop(german);
    lines.borrow_mut().push(format!("{} guest(s) left", publisher.len()));
    publisher.notify(|guest| guest.say_hello());

    drop(french);
    lines.borrow_mut().push(format!("{} guest(s) left", publisher.len()));
    lines.take()
}

/// The hand-written observer the emitter replaces.
pub trait Listener {
    fn message_a(&self) -> String;
    fn message_b(&self, text: &str) -> String;
}

#[derive(Default)]
pub struct Observable {
    listeners: Vec<Rc<dyn Listener>>,
}

impl Observable {
    pub fn add_listener(&mut self, listener: &Rc<dyn Listener>) {
        if !self.listeners.iter().any(|l| Rc::ptr_eq(l, listener)) {
            self.listeners.push(Rc::clone(listener));
        }
    }

    pub fn remove_listener(&mut self, listener: &Rc<dyn Listener>) {
        self.listeners.retain(|l| !Rc::ptr_eq(l, listener));
    }

    pub fn notify_a(&self) -> Vec<String> {
        self.listeners.iter().map(|l| l.message_a()).collect()
    }

    pub fn notify_b(&self, text: &str) -> Vec<String> {
        self.listeners.iter().map(|l| l.message_b(text)).collect()
    }
}

impl std::fmt::Debug for Observable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observable").field("listeners", &self.listeners.len()).finish()
    }
}

struct Numbered(u8);

impl Listener for Numbered {
    fn message_a(&self) -> String {
        format!("{}: A", self.0)
    }

    fn message_b(&self, text: &str) -> String {
        format!("{}: B: {text}", self.0)
    }
}

/// Two listeners on a plain observable.
#[must_use]
pub fn observer() -> Vec<String> {
    let mut observable = Observable::default();
    let first: Rc<dyn Listener> = Rc::new(Numbered(1));
    let second: Rc<dyn Listener> = Rc::new(Numbered(2));

    observable.add_listener(&first);
    observable.add_listener(&second);
    observable.add_listener(&first);

    let mut lines = observable.notify_a();
    lines.extend(observable.notify_b("ploup"));

    observable.remove_listener(&first);
    observable.remove_listener(&second);
    lines.extend(observable.notify_a());
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unchanged_names_are_not_announced() {
        let names = ["Homer Simpson", "Homer Simpson", "Marge"].map(str::to_owned);
        let lines = person(&names, &EmitterConfig::default()).unwrap();
        assert_eq!(lines, vec!["Hello Homer Simpson!", "Hello Marge!"]);
    }

    #[test]
    fn widgets_stop_reacting_once_the_dialog_is_gone() {
        let lines = widgets(2, &EmitterConfig::default()).unwrap();
        assert_eq!(lines[0], "Clicked 2 times: dialog opened 2 times (visible: true)");
        assert_eq!(lines[1], "Dialog closed: opened 2 times, button has 0 listeners");
    }

    #[test]
    fn lunch_follows_subscription_order() {
        let lines = lunch();
        assert_eq!(&lines[..2], ["Bonjour!", "Guten Tag!"]);
        assert_eq!(lines[6], "1 guest(s) left");
        assert_eq!(lines.last().map(String::as_str), Some("0 guest(s) left"));
    }

    #[test]
    fn observer_ignores_duplicate_listeners() {
        assert_eq!(observer(), vec!["1: A", "2: A", "1: B: ploup", "2: B: ploup"]);
    }

    #[test]
    fn labels_are_scoped_per_object() {
        let config = EmitterConfig::builder().label("demo").build();
        assert_eq!(labelled(&config, "button").label, "demo.button");
    }
}
