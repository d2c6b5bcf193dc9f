use std::ffi::OsString;
use std::io;
use std::path::Path;
use std::time::Duration;

use windows_service::service::{
    ServiceAccess, ServiceAction, ServiceActionType, ServiceErrorControl, ServiceFailureActions,
    ServiceFailureResetPeriod, ServiceInfo, ServiceStartType, ServiceType,
};
use windows_service::service_manager::{ServiceManager, ServiceManagerAccess};

use super::{ServiceApi, ServiceSpec, ShortcutApi, E_FAIL, ERROR_SERVICE_DOES_NOT_EXIST};

fn into_io(err: windows_service::Error) -> io::Error {
    match err {
        windows_service::Error::Winapi(e) => e,
        other => {
            tracing::debug!(error = %other, "service manager call failed");
            io::Error::from_raw_os_error(E_FAIL)
        }
    }
}

fn connect(access: ServiceManagerAccess) -> io::Result<ServiceManager> {
    ServiceManager::local_computer(None::<&str>, access).map_err(into_io)
}

fn service_info(spec: &ServiceSpec) -> ServiceInfo {
    ServiceInfo {
        name: OsString::from(&spec.name),
        display_name: OsString::from(&spec.display_name),
        service_type: ServiceType::OWN_PROCESS,
        start_type: ServiceStartType::AutoStart,
        error_control: ServiceErrorControl::Normal,
        executable_path: spec.executable.clone(),
        launch_arguments: spec.arguments.iter().map(OsString::from).collect(),
        dependencies: vec![],
        account_name: None,
        account_password: None,
    }
}

fn is_missing(err: &windows_service::Error) -> bool {
    matches!(err, windows_service::Error::Winapi(e) if e.raw_os_error() == Some(ERROR_SERVICE_DOES_NOT_EXIST))
}

/// The local Windows service control manager.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeServices;

impl ServiceApi for NativeServices {
    fn service_exists(&self, name: &str) -> io::Result<bool> {
        let manager = connect(ServiceManagerAccess::CONNECT)?;
        match manager.open_service(name, ServiceAccess::QUERY_STATUS) {
            Ok(_) => Ok(true),
            Err(e) if is_missing(&e) => Ok(false),
            Err(e) => Err(into_io(e)),
        }
    }

    fn create_service(&self, spec: &ServiceSpec) -> io::Result<()> {
        let manager =
            connect(ServiceManagerAccess::CONNECT | ServiceManagerAccess::CREATE_SERVICE)?;
        let service = manager
            .create_service(&service_info(spec), ServiceAccess::CHANGE_CONFIG)
            .map_err(into_io)?;
        service.set_description(&spec.description).map_err(into_io)
    }

    fn update_service(&self, spec: &ServiceSpec) -> io::Result<()> {
        let manager = connect(ServiceManagerAccess::CONNECT)?;
        let service = manager
            .open_service(&spec.name, ServiceAccess::CHANGE_CONFIG)
            .map_err(into_io)?;
        service.change_config(&service_info(spec)).map_err(into_io)?;
        service.set_description(&spec.description).map_err(into_io)
    }

    fn set_restart_on_failure(&self, name: &str, delay: Duration) -> io::Result<()> {
        let manager = connect(ServiceManagerAccess::CONNECT)?;
        let service = manager
            .open_service(name, ServiceAccess::CHANGE_CONFIG | ServiceAccess::START)
            .map_err(into_io)?;
        service
            .update_failure_actions(ServiceFailureActions {
                reset_period: ServiceFailureResetPeriod::After(Duration::ZERO),
                reboot_msg: None,
                command: None,
                actions: Some(vec![ServiceAction {
                    action_type: ServiceActionType::Restart,
                    delay,
                }]),
            })
            .map_err(into_io)
    }

    fn delete_service(&self, name: &str) -> io::Result<bool> {
        let manager = connect(ServiceManagerAccess::CONNECT)?;
        let service = match manager.open_service(name, ServiceAccess::DELETE) {
            Ok(service) => service,
            Err(e) if is_missing(&e) => return Ok(false),
            Err(e) => return Err(into_io(e)),
        };
        service.delete().map_err(into_io)?;
        Ok(true)
    }
}

/// Shell links written with `mslnk`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellLinks;

impl ShortcutApi for ShellLinks {
    fn create_shortcut(&self, link: &Path, target: &Path, arguments: &str) -> io::Result<()> {
        let mut shell_link = mslnk::ShellLink::new(target).map_err(|e| {
            tracing::debug!(error = ?e, "cannot build shell link");
            io::Error::from_raw_os_error(E_FAIL)
        })?;
        if !arguments.is_empty() {
            shell_link.set_arguments(Some(arguments.to_string()));
        }
        shell_link.create_lnk(link)
    }
}
