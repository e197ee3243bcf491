//! Session stores sharing one session across concurrent requests

use reinhardt_beanstore::{
	AttributeStore, BeanIdentifier, BeanStore, BeanStoreConfig, BoundBeanStore,
	ContextualInstance, LOCK_STORE_KEY, LockStore, MapAttributeStore, NamingScheme,
	SessionBeanStore, SimpleNamingScheme,
};
use rstest::rstest;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

fn naming() -> Arc<dyn NamingScheme> {
	Arc::new(SimpleNamingScheme::new("http.session").unwrap())
}

fn request_store(session: &MapAttributeStore) -> SessionBeanStore<MapAttributeStore> {
	SessionBeanStore::new(naming(), session.clone(), BeanStoreConfig::new())
}

fn shared_lock_store(session: &MapAttributeStore) -> LockStore {
	session
		.attribute(LOCK_STORE_KEY)
		.unwrap()
		.and_then(|attribute| attribute.downcast_ref::<LockStore>().cloned())
		.unwrap()
}

#[rstest]
fn test_stores_of_one_session_share_locks() {
	// Arrange
	let session = MapAttributeStore::new();
	let first = request_store(&session);
	let second = request_store(&session);
	let id = BeanIdentifier::new("cart");

	// Act
	let locked = first.lock(&id).unwrap().unwrap();
	let shared = shared_lock_store(&session);
	let count_while_held = shared.lock_count(&id);
	locked.unlock();
	second.lock(&id).unwrap().unwrap().unlock();

	// Assert
	assert_eq!(count_while_held, 1);
	assert!(shared.is_empty());
	assert_eq!(session.len(), 1);
}

#[rstest]
fn test_different_sessions_have_independent_lock_stores() {
	// Arrange
	let alice = MapAttributeStore::new();
	let bob = MapAttributeStore::new();
	let id = BeanIdentifier::new("cart");

	// Act
	let alice_lock = request_store(&alice).lock(&id).unwrap().unwrap();
	let bob_lock = request_store(&bob).lock(&id).unwrap().unwrap();

	// Assert
	assert_eq!(shared_lock_store(&alice).lock_count(&id), 1);
	assert_eq!(shared_lock_store(&bob).lock_count(&id), 1);
	alice_lock.unlock();
	bob_lock.unlock();
}

#[rstest]
fn test_concurrent_first_access_publishes_one_lock_store() {
	// Arrange
	const REQUESTS: usize = 8;
	let session = MapAttributeStore::new();
	let barrier = Arc::new(Barrier::new(REQUESTS));
	let id = BeanIdentifier::new("cart");

	// Act
	let handles: Vec<_> = (0..REQUESTS)
		.map(|_| {
			let session = session.clone();
			let barrier = barrier.clone();
			let id = id.clone();
			thread::spawn(move || {
				let store = request_store(&session);
				barrier.wait();
				let locked = store.lock(&id).unwrap().unwrap();
				let seen = shared_lock_store(&session);
				let count = seen.lock_count(&id);
				locked.unlock();
				count
			})
		})
		.collect();
	let counts: Vec<usize> = handles
		.into_iter()
		.map(|handle| handle.join().unwrap())
		.collect();

	// Assert
	assert!(counts.iter().all(|count| *count >= 1));
	assert!(shared_lock_store(&session).is_empty());
}

#[rstest]
fn test_concurrent_requests_create_session_bean_once() {
	// Arrange
	const REQUESTS: usize = 8;
	let session = MapAttributeStore::new();
	let barrier = Arc::new(Barrier::new(REQUESTS));
	let created = Arc::new(AtomicUsize::new(0));
	let id = BeanIdentifier::new("cart");

	// Act
	let handles: Vec<_> = (0..REQUESTS)
		.map(|request| {
			let session = session.clone();
			let barrier = barrier.clone();
			let created = created.clone();
			let id = id.clone();
			thread::spawn(move || {
				let store = request_store(&session);
				store.attach().unwrap();
				barrier.wait();
				let instance = {
					let _locked = store.lock(&id).unwrap().unwrap();
					match store.get(&id).unwrap() {
						Some(existing) => existing,
						None => {
							created.fetch_add(1, Ordering::SeqCst);
							let instance = ContextualInstance::new(id.clone(), request);
							store.put(id.clone(), instance.clone()).unwrap();
							instance
						}
					}
				};
				store.detach();
				*instance.instance::<usize>().unwrap()
			})
		})
		.collect();
	let seen: Vec<usize> = handles
		.into_iter()
		.map(|handle| handle.join().unwrap())
		.collect();

	// Assert
	assert_eq!(created.load(Ordering::SeqCst), 1);
	assert!(seen.windows(2).all(|pair| pair[0] == pair[1]));
}

#[rstest]
fn test_clear_keeps_shared_lock_store() {
	// Arrange
	let session = MapAttributeStore::new();
	let store = SessionBeanStore::new(
		naming(),
		session.clone(),
		BeanStoreConfig::new().with_lazy_fetching(true),
	);
	let id = BeanIdentifier::new("cart");
	store.attach().unwrap();
	store.lock(&id).unwrap().unwrap().unlock();
	store
		.put(id.clone(), ContextualInstance::new(id.clone(), 1u8))
		.unwrap();

	// Act
	store.clear().unwrap();

	// Assert
	assert!(store.ids().unwrap().is_empty());
	assert!(session.contains_key(LOCK_STORE_KEY));
	assert_eq!(session.len(), 1);
}

#[rstest]
fn test_remove_returns_instance_created_by_other_store() {
	// Arrange
	let session = MapAttributeStore::new();
	let creator = request_store(&session);
	let remover = request_store(&session);
	let id = BeanIdentifier::new("cart");
	creator.attach().unwrap();
	remover.attach().unwrap();
	creator
		.put(id.clone(), ContextualInstance::new(id.clone(), 7u32))
		.unwrap();

	// Act
	let seen = remover.get(&id).unwrap();
	let removed = remover.remove(&id).unwrap();

	// Assert
	assert!(seen.is_some());
	assert_eq!(*removed.unwrap().instance::<u32>().unwrap(), 7);
	assert!(!session.contains_key("http.session#cart"));
}

#[rstest]
fn test_detached_remove_leaves_session_untouched() {
	// Arrange
	let session = MapAttributeStore::new();
	let creator = request_store(&session);
	let remover = request_store(&session);
	let id = BeanIdentifier::new("cart");
	creator.attach().unwrap();
	creator
		.put(id.clone(), ContextualInstance::new(id.clone(), 7u32))
		.unwrap();

	// Act
	let removed = remover.remove(&id).unwrap();

	// Assert
	assert!(removed.is_none());
	assert!(session.contains_key("http.session#cart"));
}

#[rstest]
fn test_scheme_matching_lock_store_key_never_reports_it() {
	// Arrange
	let session = MapAttributeStore::new();
	let naming: Arc<dyn NamingScheme> =
		Arc::new(SimpleNamingScheme::with_delimiter("reinhardt", ".").unwrap());
	let store = SessionBeanStore::new(
		naming.clone(),
		session.clone(),
		BeanStoreConfig::new().with_lazy_fetching(true),
	);
	let id = BeanIdentifier::new("cart");
	store.attach().unwrap();
	store.lock(&id).unwrap().unwrap().unlock();
	store
		.put(id.clone(), ContextualInstance::new(id.clone(), 1u8))
		.unwrap();

	// Act
	let ids = store.ids().unwrap();
	store.clear().unwrap();

	// Assert
	assert!(naming.accept(LOCK_STORE_KEY));
	assert_eq!(ids, vec![id]);
	assert!(session.contains_key(LOCK_STORE_KEY));
	assert_eq!(session.len(), 1);
}
