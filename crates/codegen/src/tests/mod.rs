mod helpers;

mod integration_tests {
    mod basic_ops;
    mod control_ops;
    mod io_ops;
}

mod prop_tests {
    mod arithmetic_ops;
    mod control_flow;
    mod error_conditions;
    mod memory_and_storage;
}

mod unit_tests {
    mod control_flow;
    mod dispatch;
    mod evm_context;
    mod memory_and_storage;
}
