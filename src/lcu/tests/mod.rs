// Tests for the session poller, driven by scripted client doubles

#[cfg(test)]
mod test_helpers;



#[cfg(test)]
mod test_scenarios;
