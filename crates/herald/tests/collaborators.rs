pub mod fixtures;

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use herald::object::{AsObject, Object, connect, connect_slot, connect_with};
    use herald::pubsub::{Publisher, Subscription};
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    herald::events! {
        pub struct Clicked();
        pub struct Opened();
    }

    #[derive(Debug, Default)]
    struct SpinBox {
        object: Object,
    }

    impl AsObject for SpinBox {
        fn object(&self) -> &Object {
            &self.object
        }
    }

    impl SpinBox {
        fn set_value(&self, value: i32) {
            self.object.emit(ValueChanged, (value,));
        }
    }

    #[derive(Debug, Default)]
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

    #[derive(Debug, Default)]
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

    #[test]
    fn test_connect_to_an_object_signal() {
        let spin = SpinBox::default();
        let total = Rc::new(Cell::new(0));

        let t = Rc::clone(&total);
        connect(&spin, ValueChanged, move |v: &i32| t.set(t.get() + v));

        assert_eq!(total.get(), 0);
        spin.set_value(3);
        assert_eq!(total.get(), 3);
    }

    #[test]
    fn test_slot_connection_breaks_with_the_receiver() {
        let button = Button::default();
        let opened = Counter::default();

        {
            let dialog = Rc::new(Dialog::default());
            connect_slot(&button, Clicked, &dialog, Dialog::open);
            let o = opened.clone();
            connect(&*dialog, Opened, move || o.bump());

            assert_eq!(opened.get(), 0);
            button.click();
            assert_eq!(opened.get(), 1);
            assert!(dialog.visible.get());
        }

        button.click();
        assert_eq!(opened.get(), 1);
        assert!(button.object().emitter().is_empty());
    }

    #[test]
    fn test_context_connection_breaks_with_either_side() {
        let spin = SpinBox::default();
        let seen = Recorder::new();

        let context = Object::new();
        let s = seen.clone();
        connect_with(&spin, ValueChanged, &context, move |v: &i32| s.push(*v));
        spin.set_value(1);
        drop(context);
        spin.set_value(2);
        assert_eq!(seen.take(), vec![1]);

        let context = Object::new();
        let spin = SpinBox::default();
        connect_with(&spin, ValueChanged, &context, |_: &i32| {});
        assert_eq!(context.connection_count(), 1);
        drop(spin);
        assert_eq!(context.connection_count(), 0);
    }

    trait Diner {
        fn say_hello(&self);
        fn eat_it(&self, meal: &str);
    }

    struct Guest {
        greeting: &'static str,
        favourite: &'static str,
        compliment: &'static str,
        complaint: &'static str,
        log: Recorder<String>,
        subscription: RefCell<Option<Subscription<dyn Diner>>>,
    }

    impl Diner for Guest {
        fn say_hello(&self) {
            self.log.push(self.greeting.to_owned());
        }

        fn eat_it(&self, meal: &str) {
            let line = if meal == self.favourite { self.compliment } else { self.complaint };
            self.log.push(line.to_owned());
        }
    }

    fn seat(
        publisher: &Publisher<dyn Diner>,
        log: &Recorder<String>,
        greeting: &'static str,
        favourite: &'static str,
        compliment: &'static str,
        complaint: &'static str,
    ) -> Rc<Guest> {
        let guest = Rc::new(Guest {
            greeting,
            favourite,
            compliment,
            complaint,
            log: log.clone(),
            subscription: RefCell::new(None),
        });
        let diner: Rc<dyn Diner> = guest.clone();
        *guest.subscription.borrow_mut() = publisher.subscribe(&diner);
        guest
    }

    fn have_lunch(publisher: &Publisher<dyn Diner>) {
        publisher.notify(|d| d.eat_it("baguette"));
        publisher.notify(|d| d.eat_it("beer"));
    }

    #[test]
    fn test_publisher_fans_out_and_forgets_departed_subscribers() {
        let publisher: Publisher<dyn Diner> = Publisher::new();
        let log = Recorder::new();

        let french = seat(&publisher, &log, "Bonjour!", "baguette", "J'aime la baguette.", "Il manque le fromage...");
        let german = seat(&publisher, &log, "Guten Tag!", "beer", "Zwei bier!", "Ein kilogramm kartoffel, bitte!");
        assert_eq!(publisher.len(), 2);

        let again: Rc<dyn Diner> = german.clone();
        assert!(publisher.subscribe(&again).is_none());
        drop(again);
        assert_eq!(publisher.len(), 2);

        publisher.notify(|d| d.say_hello());
        have_lunch(&publisher);
        assert_eq!(
            log.take(),
            vec![
                "Bonjour!",
                "Guten Tag!",
                "J'aime la baguette.",
                "Ein kilogramm kartoffel, bitte!",
                "Il manque le fromage...",
                "Zwei bier!",
            ]
        );

        drop(german);
        assert_eq!(publisher.len(), 1);
        assert_eq!(publisher.notify(|d| d.say_hello()), 1);
        assert_eq!(log.take(), vec!["Bonjour!"]);

        let as_diner: Rc<dyn Diner> = french.clone();
        assert!(publisher.unsubscribe(&as_diner));
        assert!(publisher.is_empty());
        assert!(!french.subscription.borrow().as_ref().is_some_and(Subscription::is_attached));
        assert_eq!(publisher.notify(|d| d.say_hello()), 0);
    }
}
