//! Dispatch thread that owns the coordinator.
//!
//! [`CoordinatorService::spawn`] moves a [`Coordinator`] onto its own
//! thread. Commands from [`ServiceHandle`] and wake-ups from subsystem
//! events share one channel, so every operation observes the events posted
//! before it was issued, and events posted during an operation are drained
//! before its reply is sent.

use std::collections::BTreeSet;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle, ThreadId};

use thiserror::Error;
use tracing::{debug, info, warn};

use wlan_lifecycle::clients::{
    CoexUnsafeChannel, CountryCodeListener, InterfaceCallback, StatusListener,
};
use wlan_lifecycle::{
    AccessPointRequest, Band, Coordinator, InterfaceRole, SubsystemHealth, WorkSource,
};

const DISPATCH_THREAD_NAME: &str = "wlan-lifecycle";

type Job = Box<dyn FnOnce(&mut Coordinator) + Send>;

enum Message {
    Run(Job),
    Wake,
    Shutdown,
}

/// Errors raised while starting the dispatch thread.
#[derive(Debug, Error)]
pub enum SpawnError {
    /// The coordinator already has a waker, so it is driven elsewhere.
    #[error("coordinator already has an event waker installed")]
    WakerInstalled,
    /// The operating system refused to start the thread.
    #[error("failed to start dispatch thread: {0}")]
    Thread(#[source] std::io::Error),
}

/// Errors returned by [`ServiceHandle`] operations.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ServiceError {
    /// The dispatch thread has shut down.
    #[error("lifecycle service has stopped")]
    Stopped,
    /// The call was made from a callback running on the dispatch thread and
    /// would wait on itself.
    #[error("lifecycle service called from its own dispatch thread")]
    Reentrant,
}

/// Entry point for running a coordinator on a dedicated thread.
#[derive(Debug, Clone, Copy)]
pub struct CoordinatorService;

impl CoordinatorService {
    /// Moves `coordinator` onto a new dispatch thread.
    ///
    /// The coordinator should already be initialised. Events it has queued
    /// so far are drained as soon as the thread starts.
    ///
    /// # Errors
    ///
    /// Returns [`SpawnError::WakerInstalled`] when the coordinator is
    /// already wired to another loop and [`SpawnError::Thread`] when the
    /// thread cannot be created.
    pub fn spawn(coordinator: Coordinator) -> Result<ServiceHandle, SpawnError> {
        let (sender, receiver) = mpsc::channel();
        let waker_sender = sender.clone();
        let installed = coordinator.install_waker(Arc::new(move || {
            if waker_sender.send(Message::Wake).is_err() {
                debug!(target: "wlanctld::service", "dispatch thread gone; wake-up dropped");
            }
        }));
        if !installed {
            return Err(SpawnError::WakerInstalled);
        }

        let thread = thread::Builder::new()
            .name(DISPATCH_THREAD_NAME.to_owned())
            .spawn(move || run(coordinator, &receiver))
            .map_err(SpawnError::Thread)?;
        let dispatch_thread = thread.thread().id();

        Ok(ServiceHandle {
            inner: Arc::new(Inner {
                sender,
                dispatch_thread,
                thread: Mutex::new(Some(thread)),
            }),
        })
    }
}

fn run(mut coordinator: Coordinator, messages: &Receiver<Message>) {
    info!(target: "wlanctld::service", "dispatch thread started");
    coordinator.dispatch_pending();
    for message in messages {
        match message {
            Message::Run(job) => job(&mut coordinator),
            Message::Wake => {
                coordinator.dispatch_pending();
            }
            Message::Shutdown => break,
        }
    }
    coordinator.teardown_all_interfaces();
    coordinator.dispatch_pending();
    info!(target: "wlanctld::service", "dispatch thread stopped");
}

struct Inner {
    sender: Sender<Message>,
    dispatch_thread: ThreadId,
    thread: Mutex<Option<JoinHandle<()>>>,
}

impl Inner {
    fn on_dispatch_thread(&self) -> bool {
        thread::current().id() == self.dispatch_thread
    }

    fn stop(&self) {
        if self.sender.send(Message::Shutdown).is_err() {
            debug!(target: "wlanctld::service", "dispatch thread already stopped");
        }
        if self.on_dispatch_thread() {
            return;
        }
        let joinable = self
            .thread
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(thread) = joinable
            && thread.join().is_err()
        {
            warn!(target: "wlanctld::service", "dispatch thread panicked");
        }
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Cloneable handle to a coordinator running on its dispatch thread.
///
/// Every method blocks until the dispatch thread has run the operation and
/// drained the events it caused. Dropping the last handle tears down all
/// interfaces and stops the thread.
#[derive(Clone)]
pub struct ServiceHandle {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for ServiceHandle {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("ServiceHandle")
            .field("dispatch_thread", &self.inner.dispatch_thread)
            .finish_non_exhaustive()
    }
}

impl ServiceHandle {
    fn call<T, F>(&self, operation: F) -> Result<T, ServiceError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Coordinator) -> T + Send + 'static,
    {
        if self.inner.on_dispatch_thread() {
            return Err(ServiceError::Reentrant);
        }
        let (reply, response) = mpsc::channel();
        let job: Job = Box::new(move |coordinator| {
            let value = operation(coordinator);
            coordinator.dispatch_pending();
            if reply.send(value).is_err() {
                debug!(target: "wlanctld::service", "caller went away before the reply");
            }
        });
        self.inner
            .sender
            .send(Message::Run(job))
            .map_err(|_| ServiceError::Stopped)?;
        response.recv().map_err(|_| ServiceError::Stopped)
    }

    /// Tears down every interface and stops the dispatch thread.
    ///
    /// Later calls on any clone of this handle return
    /// [`ServiceError::Stopped`].
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Reentrant`] when called from a callback.
    pub fn shutdown(&self) -> Result<(), ServiceError> {
        if self.inner.on_dispatch_thread() {
            return Err(ServiceError::Reentrant);
        }
        self.inner.stop();
        Ok(())
    }

    /// Creates a station interface for connectivity.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] when the service cannot run the operation.
    pub fn setup_client_for_connectivity(
        &self,
        callback: Box<dyn InterfaceCallback>,
        work_source: &WorkSource,
    ) -> Result<Option<String>, ServiceError> {
        let owned_work_source = work_source.clone();
        self.call(move |coordinator| {
            coordinator.setup_client_for_connectivity(callback, &owned_work_source)
        })
    }

    /// Creates a scan-only station interface.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] when the service cannot run the operation.
    pub fn setup_client_for_scan(
        &self,
        callback: Box<dyn InterfaceCallback>,
        work_source: &WorkSource,
    ) -> Result<Option<String>, ServiceError> {
        let owned_work_source = work_source.clone();
        self.call(move |coordinator| {
            coordinator.setup_client_for_scan(callback, &owned_work_source)
        })
    }

    /// Creates an access-point interface.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] when the service cannot run the operation.
    pub fn setup_soft_ap(
        &self,
        callback: Box<dyn InterfaceCallback>,
        work_source: &WorkSource,
        request: AccessPointRequest,
    ) -> Result<Option<String>, ServiceError> {
        let owned_work_source = work_source.clone();
        self.call(move |coordinator| {
            coordinator.setup_soft_ap(callback, &owned_work_source, request)
        })
    }

    /// Tears down the named interface.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] when the service cannot run the operation.
    pub fn teardown_interface(&self, name: &str) -> Result<(), ServiceError> {
        let owned_name = name.to_owned();
        self.call(move |coordinator| coordinator.teardown_interface(&owned_name))
    }

    /// Tears down every interface.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] when the service cannot run the operation.
    pub fn teardown_all_interfaces(&self) -> Result<(), ServiceError> {
        self.call(Coordinator::teardown_all_interfaces)
    }

    /// Switches a connectivity station to scan-only mode.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] when the service cannot run the operation.
    pub fn switch_client_to_scan_mode(
        &self,
        name: &str,
        work_source: &WorkSource,
    ) -> Result<bool, ServiceError> {
        let owned_name = name.to_owned();
        let owned_work_source = work_source.clone();
        self.call(move |coordinator| {
            coordinator.switch_client_to_scan_mode(&owned_name, &owned_work_source)
        })
    }

    /// Switches a scan-only station to connectivity mode.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] when the service cannot run the operation.
    pub fn switch_client_to_connectivity_mode(
        &self,
        name: &str,
        work_source: &WorkSource,
    ) -> Result<bool, ServiceError> {
        let owned_name = name.to_owned();
        let owned_work_source = work_source.clone();
        self.call(move |coordinator| {
            coordinator.switch_client_to_connectivity_mode(&owned_name, &owned_work_source)
        })
    }

    /// Re-attributes a station interface to `work_source`.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] when the service cannot run the operation.
    pub fn replace_station_requestor(
        &self,
        name: &str,
        work_source: &WorkSource,
    ) -> Result<bool, ServiceError> {
        let owned_name = name.to_owned();
        let owned_work_source = work_source.clone();
        self.call(move |coordinator| {
            coordinator.replace_station_requestor(&owned_name, &owned_work_source)
        })
    }

    /// Reports whether a station could be created for `work_source`.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] when the service cannot run the operation.
    pub fn can_create_station(&self, work_source: &WorkSource) -> Result<bool, ServiceError> {
        let owned_work_source = work_source.clone();
        self.call(move |coordinator| coordinator.can_create_station(&owned_work_source))
    }

    /// Reports whether an access point could be created for `work_source`.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] when the service cannot run the operation.
    pub fn can_create_access_point(
        &self,
        work_source: &WorkSource,
        bridged: bool,
    ) -> Result<bool, ServiceError> {
        let owned_work_source = work_source.clone();
        self.call(move |coordinator| {
            coordinator.can_create_access_point(&owned_work_source, bridged)
        })
    }

    /// Caches and applies coexistence channel restrictions.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] when the service cannot run the operation.
    pub fn set_coex_unsafe_channels(
        &self,
        channels: Vec<CoexUnsafeChannel>,
        restrictions: u32,
    ) -> Result<bool, ServiceError> {
        self.call(move |coordinator| coordinator.set_coex_unsafe_channels(channels, restrictions))
    }

    /// Registers the aggregate status listener.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] when the service cannot run the operation.
    pub fn register_status_listener(
        &self,
        listener: Box<dyn StatusListener>,
    ) -> Result<(), ServiceError> {
        self.call(move |coordinator| coordinator.register_status_listener(listener))
    }

    /// Registers the country code listener.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] when the service cannot run the operation.
    pub fn register_country_code_listener(
        &self,
        listener: Box<dyn CountryCodeListener>,
    ) -> Result<(), ServiceError> {
        self.call(move |coordinator| coordinator.register_country_code_listener(listener))
    }

    /// Names of published station interfaces.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] when the service cannot run the operation.
    pub fn client_interface_names(&self) -> Result<BTreeSet<String>, ServiceError> {
        self.call(|coordinator| coordinator.client_interface_names())
    }

    /// Names of published access-point interfaces.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] when the service cannot run the operation.
    pub fn soft_ap_interface_names(&self) -> Result<BTreeSet<String>, ServiceError> {
        self.call(|coordinator| coordinator.soft_ap_interface_names())
    }

    /// Role of a published interface.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] when the service cannot run the operation.
    pub fn interface_role(&self, name: &str) -> Result<Option<InterfaceRole>, ServiceError> {
        let owned_name = name.to_owned();
        self.call(move |coordinator| coordinator.interface_role(&owned_name))
    }

    /// Operational state of `name` as reported by the link facility.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] when the service cannot run the operation.
    pub fn is_interface_up(&self, name: &str) -> Result<bool, ServiceError> {
        let owned_name = name.to_owned();
        self.call(move |coordinator| coordinator.is_interface_up(&owned_name))
    }

    /// Cached feature bits for `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] when the service cannot run the operation.
    pub fn supported_feature_set(&self, name: &str) -> Result<u64, ServiceError> {
        let owned_name = name.to_owned();
        self.call(move |coordinator| coordinator.supported_feature_set(&owned_name))
    }

    /// Cached driver feature bits for `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] when the service cannot run the operation.
    pub fn driver_feature_set(&self, name: &str) -> Result<u64, ServiceError> {
        let owned_name = name.to_owned();
        self.call(move |coordinator| coordinator.driver_feature_set(&owned_name))
    }

    /// Cached supported bands for `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] when the service cannot run the operation.
    pub fn supported_bands(&self, name: &str) -> Result<BTreeSet<Band>, ServiceError> {
        let owned_name = name.to_owned();
        self.call(move |coordinator| coordinator.supported_bands(&owned_name))
    }

    /// Instance names behind a bridged access point.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] when the service cannot run the operation.
    pub fn bridged_instances(&self, name: &str) -> Result<Vec<String>, ServiceError> {
        let owned_name = name.to_owned();
        self.call(move |coordinator| coordinator.bridged_instances(&owned_name))
    }

    /// Aggregate readiness.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] when the service cannot run the operation.
    pub fn is_ready(&self) -> Result<bool, ServiceError> {
        self.call(|coordinator| coordinator.is_ready())
    }

    /// Per-subsystem health flags.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] when the service cannot run the operation.
    pub fn health_snapshot(&self) -> Result<SubsystemHealth, ServiceError> {
        self.call(|coordinator| coordinator.health_snapshot())
    }
}
