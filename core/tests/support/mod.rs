//! Shared setup for the end-to-end scenarios.
//!
//! By default every `Harness` starts its own mock service on a random port,
//! seeded with one account and one pet of its own (none for
//! `Harness::start_empty`). With
//! `PETFRIENDS_E2E_LIVE=1` the scenarios run against the service named by
//! `Settings::from_env()` instead.

use std::path::{Path, PathBuf};

use petfriends_core::config::DEFAULT_IMAGES_DIR;
use petfriends_core::{AuthKey, PetFriends, PetList, Settings};
use petfriends_mock::MockService;
use tracing_subscriber::EnvFilter;

const EMAIL: &str = "user@example.com";
const PASSWORD: &str = "pw123";
const NEIGHBOUR_EMAIL: &str = "neighbour@example.com";

pub struct Harness {
    pub settings: Settings,
    pub pf: PetFriends,
    /// True when talking to the real service rather than a fresh mock.
    pub live: bool,
}

impl Harness {
    pub fn start() -> Self {
        Self::launch(true)
    }

    /// Like `start`, but the configured account owns no pets yet.
    pub fn start_empty() -> Self {
        Self::launch(false)
    }

    fn launch(with_own_pet: bool) -> Self {
        init_tracing();

        let live = std::env::var("PETFRIENDS_E2E_LIVE").as_deref() == Ok("1");
        let settings = if live {
            live_settings()
        } else {
            Settings::new(&spawn_mock(seeded_service(with_own_pet)), EMAIL, PASSWORD, images_dir())
        };
        let pf = PetFriends::from_settings(&settings);
        Self { settings, pf, live }
    }

    /// Key for the configured account; panics if the service refuses it.
    pub fn auth_key(&self) -> AuthKey {
        self.pf
            .get_api_key(&self.settings.email, &self.settings.password)
            .unwrap()
            .into_json()
            .expect("valid credentials must yield a key")
    }

    pub fn my_pets(&self, auth_key: &AuthKey) -> PetList {
        let reply = self.pf.get_list_of_pets(auth_key, "my_pets").unwrap();
        assert_eq!(reply.status, 200);
        reply.into_json().expect("pet list body")
    }

    pub fn fixture(&self, name: &str) -> PathBuf {
        self.settings.fixture(name)
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn images_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("images")
}

fn live_settings() -> Settings {
    let settings = Settings::from_env().expect("PETFRIENDS_EMAIL and PETFRIENDS_PASSWORD must be set");
    if settings.images_dir == Path::new(DEFAULT_IMAGES_DIR) {
        return settings.with_images_dir(images_dir());
    }
    settings
}

fn seeded_service(with_own_pet: bool) -> MockService {
    let service = MockService::new()
        .with_account(EMAIL, PASSWORD)
        .with_account(NEIGHBOUR_EMAIL, PASSWORD)
        .with_pet(NEIGHBOUR_EMAIL, "Шарик", "дворняга", "5");
    if with_own_pet {
        service.with_pet(EMAIL, "Барсик", "кот", "3")
    } else {
        service
    }
}

/// Start `service` on a background thread and return its base URL.
fn spawn_mock(service: MockService) -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            petfriends_mock::run(listener, service).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}
