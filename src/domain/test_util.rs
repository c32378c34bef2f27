use anyhow::anyhow;

/// Connected state of a mocked driven port. Fakes consult this so tests can
/// simulate infrastructure failure without a real backing service.
pub enum Connectivity {
    Connected,
    Disconnected,
}

impl Connectivity {
    pub fn blow_up_if_disconnected(&self) -> Result<(), anyhow::Error> {
        match self {
            Self::Connected => Ok(()),
            Self::Disconnected => Err(anyhow!("could not connect to service!")),
        }
    }
}

/// Drop-in property for mocking a single async trait function: captures the
/// arguments of every call and returns a pre-configured value. Used because
/// popular mocking crates still struggle with async functions on traits.
///
/// * [Args] is the tuple of arguments captured per call
/// * [Ret] is the function's return type
pub struct FakeImplementation<Args, Ret> {
    saved_arguments: Vec<Args>,
    return_value: Option<Ret>,
}

impl<Args, Ret> FakeImplementation<Args, Ret> {
    pub fn new() -> FakeImplementation<Args, Ret> {
        FakeImplementation {
            saved_arguments: Vec::new(),
            return_value: None,
        }
    }

    /// Records the arguments of one invocation
    pub fn save_arguments(&mut self, arguments: Args) {
        self.saved_arguments.push(arguments)
    }

    /// The argument sets from every recorded invocation, in call order
    pub fn calls(&self) -> &[Args] {
        self.saved_arguments.as_slice()
    }
}

#[allow(dead_code)]
impl<Args, Ret> FakeImplementation<Args, Ret>
where
    Ret: Clone,
{
    pub fn set_return_value(&mut self, return_value: Ret) {
        self.return_value = Some(return_value)
    }

    pub fn return_value(&self) -> Ret {
        match self.return_value {
            None => panic!("Tried to return from a function whose return value wasn't set!"),
            Some(ref value) => value.clone(),
        }
    }
}

impl<Args, Success, Fail> FakeImplementation<Args, Result<Success, Fail>>
where
    Success: Clone,
    Fail: Clone,
{
    /// [Result] itself isn't [Clone], so results are stored and returned via
    /// their cloneable contents
    pub fn set_returned_result(&mut self, return_value: Result<Success, Fail>) {
        self.return_value = Some(return_value);
    }

    pub fn return_value_result(&self) -> Result<Success, Fail> {
        match self.return_value {
            Some(Ok(ref ok_value)) => Ok(ok_value.clone()),
            Some(Err(ref err)) => Err(err.clone()),
            None => panic!("Tried to return from a function whose return value wasn't set!"),
        }
    }
}

#[allow(dead_code)]
impl<Args, Success> FakeImplementation<Args, anyhow::Result<Success>>
where
    Success: Clone,
{
    /// Special case for [anyhow::Result], since [anyhow::Error] isn't [Clone]:
    /// the stored error is reproduced through its display output
    pub fn set_returned_anyhow(&mut self, return_value: anyhow::Result<Success>) {
        match return_value {
            Ok(ok_value) => self.return_value = Some(Ok(ok_value)),
            Err(err) => self.return_value = Some(Err(anyhow!(format!("{}", err)))),
        }
    }

    pub fn return_value_anyhow(&self) -> anyhow::Result<Success> {
        match self.return_value {
            None => panic!("Tried to return from a function whose return value wasn't set!"),
            Some(Ok(ref ok_value)) => Ok(ok_value.clone()),
            Some(Err(ref err)) => Err(anyhow!(format!("{}", err))),
        }
    }
}
