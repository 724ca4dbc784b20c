use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityStatus {
    Reachable,
    Unreachable,
}

impl ConnectivityStatus {
    pub fn is_reachable(self) -> bool {
        self == ConnectivityStatus::Reachable
    }
}

/// GET `url` once. Any HTTP answer, error statuses included, means the
/// network is up; only transport failures (DNS, refused, timeout, TLS) count
/// as unreachable.
pub fn check_connectivity(url: &str, timeout: Duration) -> ConnectivityStatus {
    let agent = ureq::AgentBuilder::new().timeout(timeout).redirects(0).build();
    match agent.get(url).call() {
        Ok(res) => {
            log::debug!("{} answered {}", url, res.status());
            ConnectivityStatus::Reachable
        }
        Err(ureq::Error::Status(code, _)) => {
            log::debug!("{} answered {}", url, code);
            ConnectivityStatus::Reachable
        }
        Err(ureq::Error::Transport(e)) => {
            log::debug!("{} unreachable: {}", url, e);
            ConnectivityStatus::Unreachable
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::serve_once;
    use super::*;
    use std::net::TcpListener;

    #[test]
    fn ok_answer_is_reachable() {
        let url = serve_once("200 OK");
        let status = check_connectivity(&url, Duration::from_secs(2));
        assert_eq!(status, ConnectivityStatus::Reachable);
    }

    #[test]
    fn error_status_still_means_reachable() {
        let url = serve_once("503 Service Unavailable");
        assert!(check_connectivity(&url, Duration::from_secs(2)).is_reachable());
    }

    #[test]
    fn closed_port_is_unreachable() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let url = format!("http://127.0.0.1:{port}/");
        let status = check_connectivity(&url, Duration::from_secs(1));
        assert_eq!(status, ConnectivityStatus::Unreachable);
    }

    #[test]
    fn unresolvable_host_is_unreachable() {
        let status = check_connectivity("http://no-such-host.invalid/", Duration::from_millis(200));
        assert!(!status.is_reachable());
    }
}
