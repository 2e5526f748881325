use std::fmt::{Debug, Display};

pub fn assert_err_contains<T: Debug, E: Display>(res: Result<T, E>, msg: &str) {
    match res {
        Ok(value) => panic!("expected error containing {:?}, got Ok({:?})", msg, value),
        Err(e) => assert!(
            e.to_string().contains(msg),
            "error {:?} does not contain {:?}",
            e.to_string(),
            msg
        ),
    }
}
